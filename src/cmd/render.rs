use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::context::PluginContext;
use crate::error::AppResult;
use crate::workflow::note::{RenderedNote, render_note};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Markdown note to render.
    pub file: PathBuf,
    /// Cursor byte offset; references touching it stay as raw text.
    #[arg(long, default_value_t = 0)]
    pub cursor: usize,
    /// Render as the source editor would: every reference stays marked text.
    #[arg(long)]
    pub source_mode: bool,
}

pub async fn run(ctx: &PluginContext, args: RenderArgs) -> AppResult<RenderedNote> {
    let text = fs::read_to_string(&args.file)?;
    ctx.client().wait_until_ready().await;
    Ok(render_note(ctx, &text, args.cursor, !args.source_mode))
}
