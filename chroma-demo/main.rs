//! Headless color picker demo.
//!
//! Reads commands from stdin (or `--script`), applies them to an in-memory
//! picker screen and prints every color the controller produces:
//!
//! ```text
//! slide <channel> <value>   drag a slider
//! type <channel> [text]     replace an entry's text
//! confirm <channel>         press enter in an entry
//! wait <ms>                 let time pass
//! show                      print the screen
//! stop                      detach the controller
//! quit
//! ```

mod cli;
mod command;
mod session;

use std::io;

use anyhow::{
  Context,
  Result,
};
use clap::Parser;
use tokio::io::BufReader;

use crate::{
  cli::Cli,
  session::Session,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  cli.init_logging();

  let config = cli.sync_config()?;
  let mut session = Session::new(config, io::stdout())?;

  match &cli.script {
    Some(path) => {
      let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening script {}", path.display()))?;
      session.run(BufReader::new(file)).await?;
    },
    None => session.run(BufReader::new(tokio::io::stdin())).await?,
  }

  Ok(())
}
