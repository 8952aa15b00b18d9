use anyhow::Result;

use crate::render;

pub fn run() -> Result<()> {
    println!("{}", render::catalog_grid());
    Ok(())
}
