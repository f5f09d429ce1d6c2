//! Prints a random flat comment list, in the format returned by
//! `GET /post/{id}/comments/`, for use with `agora-ctl render`

use agora_api::{Comment, CommentId, Role, User, UserId};
use chrono::{Duration, TimeZone, Utc};
use rand::{seq::SliceRandom, Rng};

const NUM_USERS: usize = 5;
const NUM_COMMENTS: usize = 60;
const COMMENT_WORD_COUNT: usize = 12;
const MAX_DEPTH: usize = 3;
const ROOT_RATIO: f64 = 0.3;
const IMAGE_RATIO: f64 = 0.1;
const DANGLING_RATIO: f64 = 0.02;

fn gen_user(rng: &mut impl Rng, i: usize) -> User {
    let role = match i {
        0 => Role::Admin,
        _ if rng.gen_bool(0.5) => Role::Alumni,
        _ => Role::Teacher,
    };
    let mut name = lipsum::lipsum_words_with_rng(&mut *rng, 2)
        .split(' ')
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .collect::<Vec<_>>()
        .into_iter();
    let first = name.next().unwrap_or_default();
    let last = name.next().unwrap_or_default();
    User {
        id: UserId(i as i64 + 1),
        username: first.to_lowercase(),
        first_name: if role == Role::Admin { String::new() } else { first },
        last_name: if role == Role::Admin { String::new() } else { last },
        avatar: rng
            .gen_bool(0.5)
            .then(|| format!("image/upload/avatars/{}.png", i + 1)),
        role,
    }
}

fn main() {
    let mut rng = rand::thread_rng();
    let users = (0..NUM_USERS)
        .map(|i| gen_user(&mut rng, i))
        .collect::<Vec<_>>();

    let mut created_date = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    // (id, depth) of every comment that can still get a reply
    let mut open: Vec<(CommentId, usize)> = Vec::new();
    let mut comments = Vec::with_capacity(NUM_COMMENTS);
    for i in 0..NUM_COMMENTS {
        let id = CommentId(i as i64 + 1);
        let (parent, depth) = match open.choose(&mut rng) {
            Some(&(parent, depth)) if !rng.gen_bool(ROOT_RATIO) => (Some(parent), depth + 1),
            _ if rng.gen_bool(DANGLING_RATIO) => (Some(CommentId(10_000 + i as i64)), 0),
            _ => (None, 0),
        };
        if depth < MAX_DEPTH {
            open.push((id, depth));
        }
        created_date = created_date + Duration::minutes(rng.gen_range(1..90));
        comments.push(Comment {
            id,
            content: lipsum::lipsum_words_with_rng(&mut rng, COMMENT_WORD_COUNT),
            image: rng
                .gen_bool(IMAGE_RATIO)
                .then(|| format!("image/upload/comments/{}.jpg", id)),
            parent,
            user: users[rng.gen_range(0..users.len())].clone(),
            created_date,
            updated_date: rng
                .gen_bool(0.1)
                .then(|| created_date + Duration::minutes(5)),
        });
    }

    match serde_json::to_string_pretty(&comments) {
        Ok(dump) => println!("{dump}"),
        Err(e) => eprintln!("failed serializing comments: {e}"),
    }
}
