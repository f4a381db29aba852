use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::error::{AppError, AppResult};
use crate::fence::insert_ticket_fence;

#[derive(Args, Debug, Clone)]
pub struct InsertArgs {
    /// Note to edit; created if missing.
    pub file: PathBuf,
    /// Byte offset to insert at (defaults to the end of the note).
    #[arg(long)]
    pub offset: Option<usize>,
}

pub fn run(args: InsertArgs) -> AppResult<()> {
    let text = match fs::read_to_string(&args.file) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(AppError::Io(err)),
    };

    let offset = args.offset.unwrap_or(text.len());
    fs::write(&args.file, insert_ticket_fence(&text, offset))?;
    println!("Inserted ticket block into {}", args.file.display());
    Ok(())
}
