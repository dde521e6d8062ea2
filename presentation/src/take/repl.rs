//! REPL (Read-Eval-Print Loop) for taking a survey interactively

use crate::ConsoleFormatter;
use crate::config::ReplConfig;
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use selfcheck_application::{RunError, RunSession, SyncRunsUseCase, TakeSurveyUseCase};
use selfcheck_domain::{ForwardAction, OwnerScope, RunStatus};
use std::path::PathBuf;
use tracing::{debug, warn};

const HISTORY_CAPACITY: usize = 500;

/// One parsed line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplInput {
    /// A numeric answer for the current prompt
    Answer(f64),
    Next,
    Back,
    Finish,
    Summary,
    Help,
    Quit,
    Unknown(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Ok(value) = line.parse::<f64>() {
            return ReplInput::Answer(value);
        }
        match line.to_lowercase().as_str() {
            "n" | "next" => ReplInput::Next,
            "b" | "back" => ReplInput::Back,
            "f" | "finish" | "done" => ReplInput::Finish,
            "s" | "summary" => ReplInput::Summary,
            "?" | "h" | "help" => ReplInput::Help,
            "q" | "quit" | "exit" => ReplInput::Quit,
            _ => ReplInput::Unknown(line.to_string()),
        }
    }
}

/// Whether the loop keeps going after handling an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Interactive survey REPL
pub struct TakeRepl {
    take: TakeSurveyUseCase,
    sync: Option<SyncRunsUseCase>,
    scope: OwnerScope,
    config: ReplConfig,
}

impl TakeRepl {
    /// Create a new TakeRepl
    pub fn new(take: TakeSurveyUseCase, scope: OwnerScope) -> Self {
        Self {
            take,
            sync: None,
            scope,
            config: ReplConfig::default(),
        }
    }

    /// Replay queued mirror writes when the REPL exits
    pub fn with_sync(mut self, sync: SyncRunsUseCase) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL until the run is finished or the user quits.
    ///
    /// Every accepted answer is already saved when the next prompt shows,
    /// so quitting never loses progress.
    pub async fn run(&self, mut session: RunSession) -> std::io::Result<RunSession> {
        let mut line_editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("answer".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome(&session);
        if session.survey.prompts.is_empty() {
            println!("{}", "This survey has no prompts.".red());
            return Ok(session);
        }
        print!("{}", ConsoleFormatter::format_prompt(&session));

        loop {
            match line_editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let flow = self.handle_input(ReplInput::parse(&line), &mut session).await;
                    if flow == Flow::Stop {
                        break;
                    }
                }
                Signal::CtrlD => {
                    println!("Progress saved. Bye!");
                    break;
                }
                _ => {
                    println!("^C");
                }
            }
        }

        self.flush_pending().await;
        Ok(session)
    }

    async fn handle_input(&self, input: ReplInput, session: &mut RunSession) -> Flow {
        match input {
            ReplInput::Answer(value) => self.answer(session, value).await,
            ReplInput::Next => {
                if session.go_next() {
                    print!("{}", ConsoleFormatter::format_prompt(session));
                } else if session.current_value().is_none() {
                    println!("{}", "Answer this prompt first.".yellow());
                } else {
                    println!("{}", "Already at the last prompt. Type `f` to finish.".yellow());
                }
                Flow::Continue
            }
            ReplInput::Back => {
                if session.go_back() {
                    print!("{}", ConsoleFormatter::format_prompt(session));
                } else {
                    println!("{}", "Already at the first prompt.".yellow());
                }
                Flow::Continue
            }
            ReplInput::Finish => {
                if session.forward_action() == ForwardAction::Finish
                    && session.status() == RunStatus::Complete
                {
                    self.finish(session).await
                } else {
                    self.print_unfinished(session);
                    Flow::Continue
                }
            }
            ReplInput::Summary => {
                print!(
                    "{}",
                    ConsoleFormatter::format_summary(&session.survey, &session.summary())
                );
                Flow::Continue
            }
            ReplInput::Help => {
                self.print_help();
                Flow::Continue
            }
            ReplInput::Quit => {
                println!("Progress saved. Bye!");
                Flow::Stop
            }
            ReplInput::Unknown(text) => {
                println!("Unknown input: {}", text);
                println!("Type ? for help");
                Flow::Continue
            }
        }
    }

    async fn answer(&self, session: &mut RunSession, value: f64) -> Flow {
        match self.take.record_answer(&self.scope, session, value).await {
            Ok(status) => {
                debug!("Run {} is {}", session.run_id(), status);
                match session.forward_action() {
                    ForwardAction::Next => {
                        session.go_next();
                        print!("{}", ConsoleFormatter::format_prompt(session));
                        Flow::Continue
                    }
                    ForwardAction::Finish if status == RunStatus::Complete => {
                        self.finish(session).await
                    }
                    ForwardAction::Finish => {
                        self.print_unfinished(session);
                        Flow::Continue
                    }
                }
            }
            Err(RunError::InvalidAnswer(issue)) => {
                println!("{}", issue.message.red());
                Flow::Continue
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                Flow::Continue
            }
        }
    }

    async fn finish(&self, session: &mut RunSession) -> Flow {
        match self.take.finish(&self.scope, session).await {
            Ok(()) => {
                println!();
                println!("{}", "Run complete.".green().bold());
                print!(
                    "{}",
                    ConsoleFormatter::format_summary(&session.survey, &session.summary())
                );
                println!();
                println!(
                    "{}",
                    format!(
                        "Set a focus with `selfcheck focus {} rank <category>...`",
                        session.run_id()
                    )
                    .dimmed()
                );
                Flow::Stop
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                Flow::Continue
            }
        }
    }

    fn print_unfinished(&self, session: &RunSession) {
        let summary = session.summary();
        let hint = if session.forward_action() == ForwardAction::Finish {
            "Type `b` to revisit unanswered prompts."
        } else {
            "Finish is available on the last prompt once every prompt is answered."
        };
        println!(
            "{}",
            format!(
                "{} of {} answered. {}",
                summary.answered_count, summary.total_count, hint
            )
            .yellow()
        );
    }

    async fn flush_pending(&self) {
        let Some(sync) = &self.sync else {
            return;
        };
        let report = sync.retry_pending().await;
        if !report.is_clean() {
            warn!("{} mirror write(s) still pending", report.failed);
        }
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        if !self.config.save_history {
            return editor;
        }
        let Some(path) = history_path() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                debug!("History unavailable: {}", e);
                editor
            }
        }
    }

    fn print_welcome(&self, session: &RunSession) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            selfcheck - Assessment           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("{}", session.survey.title.bold());
        if let Some(description) = &session.survey.description {
            println!("{}", description.dimmed());
        }
        let summary = session.summary();
        if session.resumed {
            println!(
                "Resuming run {} ({} of {} answered)",
                session.run_id(),
                summary.answered_count,
                summary.total_count
            );
        } else {
            println!("Started run {}", session.run_id());
        }
        if self.config.show_help {
            println!();
            self.print_help();
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  <number>  - Answer the current prompt and move on");
        println!("  n         - Next prompt");
        println!("  b         - Previous prompt");
        println!("  s         - Show the summary so far");
        println!("  f         - Finish the run (last prompt, all answered)");
        println!("  q         - Quit (progress is kept)");
        println!("  ?         - Show this help");
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("selfcheck").join("history.txt"))
}
