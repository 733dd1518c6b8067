//! Line-oriented front-end over `DictationTrainer`.
//!
//! The shell has three views derived from trainer state: the topic library,
//! a pending custom topic, and a running lesson. In a lesson, lines starting
//! with `:` are commands and every other line is a transcription attempt.

use std::io::{self, Write};

use dictation_core::Level;
use services::{Advance, DictationTrainer, Evaluation, SpeechRate, TrainerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Library,
    Draft,
    Lesson,
}

pub struct Shell<W> {
    trainer: DictationTrainer,
    out: W,
    awaiting_finish: bool,
}

impl<W: Write> Shell<W> {
    pub fn new(trainer: DictationTrainer, out: W) -> Self {
        Self {
            trainer,
            out,
            awaiting_finish: false,
        }
    }

    #[cfg(test)]
    pub fn trainer(&self) -> &DictationTrainer {
        &self.trainer
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    fn view(&self) -> View {
        if self.trainer.session().is_some() {
            View::Lesson
        } else if self.trainer.draft().is_some() {
            View::Draft
        } else {
            View::Library
        }
    }

    /// Print the library and the available commands.
    ///
    /// # Errors
    ///
    /// Returns the writer's I/O error.
    pub fn greet(&mut self) -> io::Result<()> {
        self.print_library()?;
        self.print_help()
    }

    /// # Errors
    ///
    /// Returns the writer's I/O error.
    pub fn write_prompt(&mut self) -> io::Result<()> {
        let prompt = if self.awaiting_finish {
            "finish? [y/N] "
        } else {
            match self.view() {
                View::Library => "library> ",
                View::Draft => "new topic> ",
                View::Lesson => "> ",
            }
        };
        write!(self.out, "{prompt}")?;
        self.out.flush()
    }

    /// Handle one line of input.
    ///
    /// # Errors
    ///
    /// Returns the writer's I/O error. Domain errors are printed, not
    /// returned.
    pub async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let line = line.trim_end_matches(['\r', '\n']);

        if self.awaiting_finish {
            self.awaiting_finish = false;
            if matches!(line.trim(), "y" | "Y" | "yes" | "j" | "ja") {
                self.trainer.finish_session();
                writeln!(self.out, "Lesson finished.")?;
                self.print_library()?;
            }
            return Ok(Flow::Continue);
        }

        match self.view() {
            View::Library => self.handle_library(line.trim()),
            View::Draft => self.handle_draft(line.trim()).await,
            View::Lesson => self.handle_lesson(line),
        }
    }

    //
    // ─── LIBRARY ───────────────────────────────────────────────────────────────
    //

    fn handle_library(&mut self, line: &str) -> io::Result<Flow> {
        let (command, rest) = split_command(line);
        match command {
            "" => {}
            "list" | "ls" => self.print_library()?,
            "open" | "o" => match rest.parse::<usize>() {
                Ok(number) if number > 0 => self.open_topic(number - 1)?,
                _ => writeln!(self.out, "usage: open <number>")?,
            },
            "new" => match self.trainer.begin_custom_topic(rest) {
                Ok(_) => {
                    writeln!(self.out, "Text accepted.")?;
                    writeln!(
                        self.out,
                        "  save <level> <title>   save it (level e.g. A1..C1 or Custom)"
                    )?;
                    writeln!(self.out, "  practice               practice without saving")?;
                    writeln!(self.out, "  cancel                 discard the text")?;
                }
                Err(err) => self.print_error(&err)?,
            },
            "help" | "?" => self.print_help()?,
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            other => writeln!(self.out, "unknown command: {other} (try help)")?,
        }
        Ok(Flow::Continue)
    }

    fn open_topic(&mut self, index: usize) -> io::Result<()> {
        match self.trainer.select_topic(index) {
            Ok(_) => self.print_position(),
            Err(err) => self.print_error(&err),
        }
    }

    //
    // ─── DRAFT ─────────────────────────────────────────────────────────────────
    //

    async fn handle_draft(&mut self, line: &str) -> io::Result<Flow> {
        let (command, rest) = split_command(line);
        match command {
            "" => {}
            "save" => {
                let (level, title) = split_command(rest);
                match self.trainer.save_draft(title, Level::parse(level)).await {
                    Ok(index) => {
                        writeln!(self.out, "Saved as topic {}.", index + 1)?;
                        self.print_position()?;
                    }
                    Err(err) => self.print_error(&err)?,
                }
            }
            "practice" => match self.trainer.practice_draft() {
                Ok(_) => self.print_position()?,
                Err(err) => self.print_error(&err)?,
            },
            "cancel" => {
                self.trainer.cancel_draft();
                self.print_library()?;
            }
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            other => writeln!(self.out, "unknown command: {other} (save, practice, cancel)")?,
        }
        Ok(Flow::Continue)
    }

    //
    // ─── LESSON ────────────────────────────────────────────────────────────────
    //

    fn handle_lesson(&mut self, line: &str) -> io::Result<Flow> {
        let Some(command) = line.trim_start().strip_prefix(':') else {
            return self.check(line);
        };

        let (command, rest) = split_command(command.trim());
        match command {
            "play" | "p" => {
                self.trainer.play_current();
            }
            "next" | "n" => self.next()?,
            "prev" | "b" => {
                let moved = self
                    .trainer
                    .session_mut()
                    .is_some_and(services::LessonSession::prev);
                if moved {
                    self.print_position()?;
                } else {
                    writeln!(self.out, "Already at the first sentence.")?;
                }
            }
            "rate" if rest.is_empty() => {
                let narrator = self.trainer.narrator();
                writeln!(
                    self.out,
                    "Speech rate is {} ({}).",
                    narrator.rate(),
                    narrator.language()
                )?;
            }
            "rate" => match rest.parse::<f32>().map(SpeechRate::new) {
                Ok(Ok(rate)) => {
                    self.trainer.narrator_mut().set_rate(rate);
                    writeln!(self.out, "Speech rate set to {rate}.")?;
                }
                Ok(Err(err)) => writeln!(self.out, "{err}")?,
                Err(_) => writeln!(self.out, "usage: :rate <0.1..10>")?,
            },
            "back" | "home" => {
                self.trainer.exit_session();
                self.print_library()?;
            }
            "help" | "?" => self.print_help()?,
            "quit" | "q" => return Ok(Flow::Quit),
            other => writeln!(self.out, "unknown command: :{other} (try :help)")?,
        }
        Ok(Flow::Continue)
    }

    fn check(&mut self, line: &str) -> io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        let Some(session) = self.trainer.session_mut() else {
            return Ok(Flow::Continue);
        };
        match session.evaluate(line) {
            Ok(evaluation) => self.print_evaluation(&evaluation)?,
            Err(err) => writeln!(self.out, "{err} (:next or :prev to move on)")?,
        }
        Ok(Flow::Continue)
    }

    fn next(&mut self) -> io::Result<()> {
        let Some(session) = self.trainer.session_mut() else {
            return Ok(());
        };
        match session.next() {
            Advance::Moved { .. } => self.print_position(),
            Advance::FinishPending => {
                self.awaiting_finish = true;
                writeln!(self.out, "Lesson finished! Go back to topics?")
            }
        }
    }

    //
    // ─── OUTPUT ────────────────────────────────────────────────────────────────
    //

    fn print_library(&mut self) -> io::Result<()> {
        writeln!(self.out, "Topics:")?;
        for (index, topic) in self.trainer.library().iter().enumerate() {
            writeln!(
                self.out,
                "  {:>2}. [{}] {} ({} sentences)",
                index + 1,
                topic.level(),
                topic.title(),
                topic.sentence_count()
            )?;
        }
        Ok(())
    }

    fn print_position(&mut self) -> io::Result<()> {
        let Some(session) = self.trainer.session() else {
            return Ok(());
        };
        let progress = session.progress();
        let next_label = if progress.is_last { "finish" } else { "next" };
        writeln!(
            self.out,
            "Level: {} | Sentence {} / {} ({:.0}%) | :play to listen, :{next_label} when done",
            session.level(),
            progress.position,
            progress.total,
            progress.fraction * 100.0,
        )
    }

    fn print_evaluation(&mut self, evaluation: &Evaluation) -> io::Result<()> {
        if evaluation.correct {
            writeln!(self.out, "Perfekt! Correct.")
        } else {
            writeln!(self.out, "Correct: {}", evaluation.expected)?;
            writeln!(self.out, "You:     {}", evaluation.actual)
        }
    }

    fn print_error(&mut self, err: &TrainerError) -> io::Result<()> {
        writeln!(self.out, "error: {err}")
    }

    fn print_help(&mut self) -> io::Result<()> {
        writeln!(self.out, "Library: list | open <n> | new <text> | quit")?;
        writeln!(
            self.out,
            "Lesson:  type the sentence you hear | :play | :next | :prev | :rate <x> | :back"
        )
    }
}

/// Split `line` into its first word and the trimmed remainder.
fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}
