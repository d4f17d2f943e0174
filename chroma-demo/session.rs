//! Drives a [`ColorScreen`] from text commands, playing the part of both the
//! user and the UI thread.

use std::{
  cell::RefCell,
  io::Write,
  rc::Rc,
};

use anyhow::Result;
use chroma_event::{
  Subscription,
  ui::{
    self,
    UiJobs,
  },
};
use chroma_sync::{
  ColorScreen,
  ColorSurface,
  ColorSyncController,
  Rgba,
  SyncConfig,
};
use tokio::{
  io::{
    AsyncBufRead,
    AsyncBufReadExt,
  },
  time::Instant,
};

use crate::command::Command;

pub struct Session<W> {
  screen:     ColorScreen,
  jobs:       UiJobs<ColorScreen>,
  controller: ColorSyncController,
  colors:     Rc<RefCell<Vec<Rgba>>>,
  _colors:    Subscription,
  out:        W,
}

impl<W: Write> Session<W> {
  pub fn new(config: SyncConfig, out: W) -> Result<Self> {
    let mut screen = ColorScreen::new();
    let (queue, mut jobs) = ui::channel();
    let controller = ColorSyncController::start(config, &mut screen, queue)?;
    jobs.drain(&mut screen);

    let colors = Rc::new(RefCell::new(Vec::new()));
    let subscription = controller.colors().subscribe({
      let colors = Rc::clone(&colors);
      move |color| colors.borrow_mut().push(*color)
    });

    Ok(Self {
      screen,
      jobs,
      controller,
      colors,
      _colors: subscription,
      out,
    })
  }

  /// Execute commands from `input` until it ends or asks to quit.
  pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
    let mut lines = input.lines();
    writeln!(self.out, "{}", self.screen)?;

    loop {
      tokio::select! {
        line = lines.next_line() => {
          let Some(line) = line? else {
            break;
          };
          let line = line.trim();
          if line.is_empty() || line.starts_with('#') {
            continue;
          }
          match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => self.execute(command).await?,
            Err(err) => writeln!(self.out, "error: {err:#}")?,
          }
        },
        Some(job) = self.jobs.next() => {
          job(&mut self.screen);
          self.report_colors()?;
        },
      }
    }

    self.controller.stop();
    Ok(())
  }

  pub async fn execute(&mut self, command: Command) -> Result<()> {
    log::debug!("{command:?}");
    match command {
      Command::Slide(channel, value) => self.screen.slider_mut(channel).drag(value),
      Command::Type(channel, text) => self.screen.entry_mut(channel).type_text(&text),
      Command::Confirm(channel) => self.screen.entry(channel).confirm(),
      Command::Wait(duration) => self.run_jobs_until(Instant::now() + duration).await,
      Command::Show => writeln!(self.out, "{}", self.screen)?,
      Command::Stop => {
        self.controller.stop();
        writeln!(self.out, "stopped")?;
      },
      Command::Quit => {},
    }
    self.jobs.drain(&mut self.screen);
    self.report_colors()
  }

  async fn run_jobs_until(&mut self, deadline: Instant) {
    loop {
      tokio::select! {
        _ = tokio::time::sleep_until(deadline) => break,
        Some(job) = self.jobs.next() => job(&mut self.screen),
      }
    }
  }

  fn report_colors(&mut self) -> Result<()> {
    let colors: Vec<Rgba> = self.colors.borrow_mut().drain(..).collect();
    for color in colors {
      writeln!(self.out, "color {color}")?;
    }
    Ok(())
  }

  pub fn into_output(self) -> W {
    self.out
  }
}
