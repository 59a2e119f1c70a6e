// Only a directive string or `nested` is accepted inside env(...)

use envtag::Record;

#[allow(dead_code)]
#[derive(Record)]
struct Config {
    #[env(flatten)]
    block: u16,
}

fn main() {}
