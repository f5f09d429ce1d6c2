use std::{io::BufRead, path::PathBuf};

use agora_client::{
    api::{CommentId, ImageAttachment, PostId},
    render::Rendered,
    CommentCoordinator, HttpBackend, Notice, NoticeLevel, Session, ThreadPolicy,
};
use anyhow::Context;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the API
    #[structopt(short, long, env = "AGORA_HOST")]
    host: Option<String>,

    /// Bearer token of the acting user
    #[structopt(short, long, env = "AGORA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Show the comment thread of a post
    Thread { post: i64 },

    /// Comment on a post
    Comment {
        post: i64,
        content: String,

        /// JPEG image to attach
        #[structopt(long, parse(from_os_str))]
        image: Option<PathBuf>,
    },

    /// Reply to a comment
    Reply {
        post: i64,
        comment: i64,
        content: String,

        #[structopt(long, parse(from_os_str))]
        image: Option<PathBuf>,
    },

    /// Edit one of your comments
    Edit {
        post: i64,
        comment: i64,
        content: String,

        /// Replacement image; the current one is kept if omitted
        #[structopt(long, parse(from_os_str))]
        image: Option<PathBuf>,
    },

    /// Delete a comment and all its replies
    Delete {
        post: i64,
        comment: i64,

        /// Do not ask for confirmation
        #[structopt(long)]
        yes: bool,
    },

    /// Lock or unlock commenting on a post
    Lock { post: i64 },

    /// Render a comment list dumped as JSON, without any server
    Render {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
}

fn read_image(path: Option<PathBuf>) -> anyhow::Result<Option<ImageAttachment>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let data = std::fs::read(&path).with_context(|| format!("reading image {path:?}"))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.jpg");
    Ok(Some(ImageAttachment::jpeg(name, data)))
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    eprint!("{question} [y/N] ");
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("reading confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn show_notices(notices: Vec<Notice>) {
    for n in notices {
        match n.level {
            NoticeLevel::Info => eprintln!("{}", n.message),
            NoticeLevel::Error => eprintln!("error: {}", n.message),
        }
    }
}

async fn open(opt: &Opt, post: i64) -> anyhow::Result<CommentCoordinator<HttpBackend>> {
    let host = opt.host.as_deref().context("no host given, set AGORA_HOST")?;
    let token = opt.token.as_deref().context("no token given, set AGORA_TOKEN")?;
    let session = Session::connect(HttpBackend::new(host, token))
        .await
        .context("authenticating")?;
    tracing::debug!(user = %session.user.username, "authenticated");
    session
        .open_thread(PostId(post))
        .await
        .with_context(|| format!("opening thread of post {post}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let now = chrono::Utc::now();

    let mut thread = match &opt.cmd {
        Command::Render { file } => {
            let raw = std::fs::read(file).with_context(|| format!("reading {file:?}"))?;
            let value: serde_json::Value =
                serde_json::from_slice(&raw).context("parsing comment dump")?;
            let forest = agora_client::build_comment_tree_from_value(value)
                .context("decoding comment dump")?;
            print!("{}", Rendered::new(&forest, ThreadPolicy::default(), false, now));
            return Ok(());
        }
        Command::Thread { post }
        | Command::Comment { post, .. }
        | Command::Reply { post, .. }
        | Command::Edit { post, .. }
        | Command::Delete { post, .. }
        | Command::Lock { post } => open(&opt, *post).await?,
    };

    let res = match opt.cmd {
        Command::Thread { .. } | Command::Render { .. } => Ok(()),
        Command::Comment { content, image, .. } => thread
            .add_comment(&content, read_image(image)?)
            .await
            .map(drop),
        Command::Reply {
            comment,
            content,
            image,
            ..
        } => thread
            .add_reply(CommentId(comment), &content, read_image(image)?)
            .await
            .map(drop),
        Command::Edit {
            comment,
            content,
            image,
            ..
        } => thread
            .edit_comment(CommentId(comment), &content, read_image(image)?)
            .await
            .map(drop),
        Command::Delete { comment, yes, .. } => {
            let pending = thread.request_delete(CommentId(comment))?;
            if !yes && !confirm("Delete this comment and all its replies?")? {
                eprintln!("Cancelled.");
                return Ok(());
            }
            thread.confirm_delete(pending).await.map(drop)
        }
        Command::Lock { .. } => thread.toggle_comment_lock().await.map(|locked| {
            eprintln!("Comments are now {}.", if locked { "locked" } else { "open" });
        }),
    };
    show_notices(thread.take_notices());
    res?;

    print!("{}", thread.render(now));
    Ok(())
}
