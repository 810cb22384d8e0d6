//! Routes command

use crate::chat;

pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let tree = chat::routes()?;
    for (name, pattern) in tree.patterns() {
        println!("{:<24} {}", name, pattern);
    }
    Ok(())
}
