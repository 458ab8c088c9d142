use anyhow::Result;
use owo_colors::OwoColorize;

use crate::store::Store;

pub fn show(store: &Store) -> Result<()> {
    let memory = store.memory()?;
    if memory.is_empty() {
        println!("{}", "Nothing remembered yet".dimmed());
    } else {
        println!("{memory}");
    }
    println!("{}", format!("(stored in {})", store.dir().display()).dimmed());
    Ok(())
}

pub fn reset(store: &Store) -> Result<()> {
    store.reset_memory()?;
    println!("{}", "Memory cleared".green());
    Ok(())
}
