use std::fs;
use std::path::Path;

/// Load a test feed fixture by name
pub fn load_feed_fixture(fixture_name: &str) -> String {
    let path = Path::new("src/tests/fixtures").join(format!("{}.rss", fixture_name));
    fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to load test fixture: {}", fixture_name))
}
