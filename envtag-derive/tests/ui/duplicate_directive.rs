// A field takes a single env attribute

use envtag::Record;

#[allow(dead_code)]
#[derive(Record)]
struct Config {
    #[env("PORT")]
    #[env("OTHER_PORT")]
    port: u16,
}

fn main() {}
