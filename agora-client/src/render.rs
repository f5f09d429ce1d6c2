use std::fmt;

use crate::{
    api::Time,
    thread::{self, ThreadNode},
    ThreadPolicy,
};

/// Deeper replies are drawn at this indentation level
const MAX_INDENT: usize = 16;

/// Plain-text rendering of a comment forest, one indentation level per depth
pub struct Rendered<'a> {
    forest: &'a [ThreadNode],
    policy: ThreadPolicy,
    locked: bool,
    now: Time,
}

impl<'a> Rendered<'a> {
    pub fn new(forest: &'a [ThreadNode], policy: ThreadPolicy, locked: bool, now: Time) -> Self {
        Rendered {
            forest,
            policy,
            locked,
            now,
        }
    }

    fn node(&self, f: &mut fmt::Formatter<'_>, node: &ThreadNode, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth.min(MAX_INDENT));
        write!(
            f,
            "{indent}#{} {} · {}",
            node.id,
            node.user.display_name(),
            relative_time(node.created_date, self.now),
        )?;
        if !self.locked && self.policy.can_reply(depth) {
            f.write_str(" [reply]")?;
        }
        writeln!(f)?;
        for line in node.content.lines() {
            writeln!(f, "{indent}  {line}")?;
        }
        if let Some(url) = node.image_url() {
            writeln!(f, "{indent}  [image: {url}]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.forest.is_empty() {
            return writeln!(f, "(no comments)");
        }
        for (depth, node) in thread::walk(self.forest) {
            self.node(f, node, depth)?;
        }
        Ok(())
    }
}

/// Human description of how long ago `then` was, eg. "5 minutes ago"
pub fn relative_time(then: Time, now: Time) -> String {
    let secs = (now - then).num_seconds();
    let span = describe_span(secs.unsigned_abs());
    match secs < 0 {
        true => format!("in {span}"),
        false => format!("{span} ago"),
    }
}

fn describe_span(secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let rounded = |unit: u64| (secs + unit / 2) / unit;
    match secs {
        s if s < 45 => String::from("a few seconds"),
        s if s < 90 => String::from("a minute"),
        _ if rounded(MINUTE) < 45 => format!("{} minutes", rounded(MINUTE)),
        s if s < 90 * MINUTE => String::from("an hour"),
        _ if rounded(HOUR) < 22 => format!("{} hours", rounded(HOUR)),
        s if s < 36 * HOUR => String::from("a day"),
        _ if rounded(DAY) < 26 => format!("{} days", rounded(DAY)),
        _ if rounded(DAY) < 45 => String::from("a month"),
        _ if rounded(DAY) < 320 => format!("{} months", (rounded(DAY) * 10 + 152) / 304),
        _ if rounded(DAY) < 548 => String::from("a year"),
        _ => format!("{} years", (rounded(DAY) + 182) / 365),
    }
}
