use anyhow::Result;
use owo_colors::OwoColorize;

use crate::store::Store;

pub fn run(store: &Store, id: u64) -> Result<()> {
    match store.remove(id)? {
        Some(removed) => println!("{} {}", "-".red(), removed.event),
        None => println!("{}", format!("No event with id #{id}").yellow()),
    }
    Ok(())
}
