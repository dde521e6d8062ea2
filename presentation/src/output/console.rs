//! Console output formatter for surveys, runs and results

use colored::Colorize;
use selfcheck_application::{RunOverview, RunResults, RunSession, SyncReport};
use selfcheck_domain::core::string::truncate;
use selfcheck_domain::{
    FocusMode, FocusState, ResultSummary, SurveyBlueprint, Timestamp, ValidationIssue,
};
use serde::Serialize;

/// Width of the score bars in result views.
const BAR_WIDTH: usize = 20;

/// Longest survey title shown in the run history.
const HISTORY_TITLE_WIDTH: usize = 40;

/// Scales with more selectable values than this show only their bounds.
const MAX_LISTED_CHOICES: usize = 11;

/// Formats domain values for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Pretty JSON of any serializable value
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// One line per blueprint
    pub fn format_survey_list(surveys: &[SurveyBlueprint]) -> String {
        if surveys.is_empty() {
            return format!("{}\n", "No surveys stored. Run `selfcheck seed` to add one.".dimmed());
        }
        let mut output = Self::section_header("Surveys");
        for survey in surveys {
            output.push_str(&format!(
                "  {} {} {}\n",
                survey.survey_id.yellow().bold(),
                survey.title,
                format!("(v{}, {} prompts)", survey.version, survey.prompt_count()).dimmed()
            ));
        }
        output
    }

    /// Full blueprint: scale, categories and prompts grouped by category
    pub fn format_survey(survey: &SurveyBlueprint) -> String {
        let mut output = Self::header(&survey.title);
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Id:".cyan().bold(), survey.survey_id));
        output.push_str(&format!("{} {}\n", "Version:".cyan().bold(), survey.version));
        if let Some(description) = &survey.description {
            output.push_str(&format!("{} {}\n", "About:".cyan().bold(), description));
        }
        output.push_str(&format!(
            "{} {} to {} (step {})\n",
            "Scale:".cyan().bold(),
            survey.scale.min,
            survey.scale.max,
            survey.scale.step
        ));

        for category in &survey.categories {
            output.push_str(&Self::section_header(&format!(
                "{} [{}]",
                category.label, category.category_id
            )));
            for prompt in survey.prompts_in(&category.category_id) {
                output.push_str(&format!("  {} {}\n", prompt.prompt_id.yellow(), prompt.text));
                if let Some(help) = &prompt.help_text {
                    output.push_str(&format!("      {}\n", help.dimmed()));
                }
            }
        }
        output.push_str(&Self::footer());
        output
    }

    /// Validator issues, or a success line when there are none
    pub fn format_issues(issues: &[ValidationIssue]) -> String {
        if issues.is_empty() {
            return format!("{}\n", "Blueprint is valid.".green().bold());
        }
        let mut output = format!(
            "{}\n",
            format!("Blueprint has {} issue(s):", issues.len()).red().bold()
        );
        for issue in issues {
            output.push_str(&format!(
                "  {} {} {}\n",
                issue.code.to_string().red(),
                issue.path.yellow(),
                issue.message
            ));
        }
        output
    }

    /// The current prompt of an interactive run
    pub fn format_prompt(session: &RunSession) -> String {
        let Some(prompt) = session.current_prompt() else {
            return format!("{}\n", "This survey has no prompts.".red());
        };
        let (position, total) = session.position();
        let category = session
            .survey
            .category(&prompt.category_id)
            .map(|c| c.label.as_str())
            .unwrap_or(prompt.category_id.as_str());

        let mut output = format!(
            "\n{} {}\n",
            format!("[{}/{}]", position, total).cyan().bold(),
            category.dimmed()
        );
        output.push_str(&format!("{}\n", prompt.text.bold()));
        if let Some(help) = &prompt.help_text {
            output.push_str(&format!("{}\n", help.dimmed()));
        }

        let scale = &session.survey.scale;
        let choices = scale.values();
        let range = if (2..=MAX_LISTED_CHOICES).contains(&choices.len()) {
            choices
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            format!("{} to {}", scale.min, scale.max)
        };
        let current = session
            .current_value()
            .map(|v| format!(", current: {}", v))
            .unwrap_or_default();
        output.push_str(&format!("{}\n", format!("({}{})", range, current).dimmed()));
        output
    }

    /// Results view: overall figures and one bar per category
    pub fn format_results(results: &RunResults) -> String {
        let mut output = Self::header(&format!("Results: {}", results.survey.title));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Run:".cyan().bold(), results.run.run_id));
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), results.status));
        output.push_str(&format!(
            "{} {}\n",
            "Started:".cyan().bold(),
            Self::format_timestamp(results.run.started_at)
        ));
        if let Some(completed) = results.run.completed_at {
            output.push_str(&format!(
                "{} {}\n",
                "Completed:".cyan().bold(),
                Self::format_timestamp(completed)
            ));
        }

        output.push_str(&Self::format_summary(&results.survey, &results.summary));

        if let Some(focus) = &results.run.focus {
            output.push_str(&Self::format_focus(&results.survey, focus));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Per-category averages with bars scaled to the blueprint range
    pub fn format_summary(survey: &SurveyBlueprint, summary: &ResultSummary) -> String {
        let mut output = Self::section_header("Summary");
        output.push_str(&format!(
            "  {} {}/{} ({:.0}%)   {} {}\n",
            "Answered:".bold(),
            summary.answered_count,
            summary.total_count,
            summary.progress() * 100.0,
            "Overall:".bold(),
            Self::format_avg(summary.overall_avg)
        ));
        output.push('\n');

        let label_width = survey
            .categories
            .iter()
            .map(|c| c.label.chars().count())
            .max()
            .unwrap_or(0);

        for category in &survey.categories {
            let Some(stat) = summary.category(&category.category_id) else {
                continue;
            };
            let bar = stat
                .avg
                .map(|avg| Self::bar(avg, survey.scale.min, survey.scale.max))
                .unwrap_or_else(|| "·".repeat(BAR_WIDTH).dimmed().to_string());
            output.push_str(&format!(
                "  {:<width$}  {}  {} {}\n",
                category.label,
                bar,
                Self::format_avg(stat.avg),
                format!("({} answered)", stat.count).dimmed(),
                width = label_width
            ));
        }
        output
    }

    /// Focus selection in its current mode
    pub fn format_focus(survey: &SurveyBlueprint, focus: &FocusState) -> String {
        let label = |id: &str| {
            survey
                .category(id)
                .map(|c| c.label.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let mut output = Self::section_header(&format!("Focus ({})", focus.mode));
        match focus.mode {
            FocusMode::Rank => {
                if focus.ranks().is_empty() {
                    output.push_str(&format!("  {}\n", "No categories ranked.".dimmed()));
                }
                for (i, id) in focus.ranks().iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, label(id)));
                }
            }
            FocusMode::Points => {
                for id in &focus.selected_category_ids {
                    output.push_str(&format!(
                        "  {:>3}  {}\n",
                        focus.points_for(id),
                        label(id)
                    ));
                }
                output.push_str(&format!(
                    "  {}\n",
                    format!(
                        "{} of {} points allocated, {} remaining",
                        focus.total_allocated(),
                        focus.budget(),
                        focus.remaining()
                    )
                    .dimmed()
                ));
            }
        }
        output
    }

    /// Run history table
    pub fn format_history(runs: &[RunOverview]) -> String {
        if runs.is_empty() {
            return format!("{}\n", "No runs yet.".dimmed());
        }
        let mut output = Self::section_header("Runs");
        for run in runs {
            let state = if run.completed_at.is_some() {
                "done".green()
            } else {
                "open".yellow()
            };
            output.push_str(&format!(
                "  {}  {}  {:<4}  {}/{}  avg {}  {}\n",
                run.run_id.bold(),
                Self::format_timestamp(run.started_at).dimmed(),
                state,
                run.answered_count,
                run.total_count,
                Self::format_avg(run.overall_avg),
                truncate(
                    run.survey_title.as_deref().unwrap_or(&run.survey_id),
                    HISTORY_TITLE_WIDTH
                )
            ));
        }
        output
    }

    pub fn format_sync_report(report: &SyncReport) -> String {
        let line = format!(
            "{} pushed, {} removed, {} failed, {} dropped",
            report.pushed, report.removed, report.failed, report.dropped
        );
        if report.is_clean() {
            format!("{}\n", line.green())
        } else {
            format!("{}\n", line.yellow())
        }
    }

    /// Average with two decimals, or a dash when there is none
    pub fn format_avg(avg: Option<f64>) -> String {
        avg.map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Milliseconds since the epoch as local date and time
    pub fn format_timestamp(millis: Timestamp) -> String {
        chrono::DateTime::from_timestamp_millis(millis as i64)
            .map(|dt| {
                dt.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| millis.to_string())
    }

    fn bar(value: f64, min: f64, max: f64) -> String {
        let ratio = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (ratio * BAR_WIDTH as f64).round() as usize;
        format!(
            "{}{}",
            "█".repeat(filled).green(),
            "░".repeat(BAR_WIDTH - filled).dimmed()
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfcheck_domain::{
        Category, Prompt, ResponseState, RunCursor, RunStatus, Scale, compute_summary,
        default_survey,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_avg() {
        assert_eq!(ConsoleFormatter::format_avg(Some(11.0 / 3.0)), "3.67");
        assert_eq!(ConsoleFormatter::format_avg(None), "-");
    }

    #[test]
    fn test_bar_is_scaled_to_range() {
        plain();
        let full = ConsoleFormatter::bar(10.0, 1.0, 10.0);
        let empty = ConsoleFormatter::bar(1.0, 1.0, 10.0);
        assert_eq!(full, "█".repeat(BAR_WIDTH));
        assert_eq!(empty, "░".repeat(BAR_WIDTH));
    }

    #[test]
    fn test_format_issues() {
        plain();
        let mut survey = default_survey();
        survey.title = String::new();
        let issues = selfcheck_domain::validate_survey(&survey).into_issues();

        let text = ConsoleFormatter::format_issues(&issues);
        assert!(text.contains("1 issue(s)"));
        assert!(text.contains("EMPTY title"));
        assert!(ConsoleFormatter::format_issues(&[]).contains("valid"));
    }

    #[test]
    fn test_format_results_lists_every_category() {
        plain();
        let survey = default_survey();
        let mut run = ResponseState::start("r_1", &survey.survey_id, 0);
        run.answers.insert("p_energy".into(), 8.0);
        let results = RunResults {
            summary: compute_summary(&survey, &run.answers),
            status: RunStatus::InProgress,
            run,
            survey,
        };

        let text = ConsoleFormatter::format_results(&results);
        assert!(text.contains("Answered: 1/3"));
        assert!(text.contains("Energy"));
        assert!(text.contains("8.00"));
        assert!(text.contains("Mood"));
    }

    fn session_at(survey: SurveyBlueprint, index: usize) -> RunSession {
        RunSession {
            run: ResponseState::start("r_1", &survey.survey_id, 0),
            survey,
            cursor: RunCursor::at(index),
            resumed: false,
        }
    }

    #[test]
    fn test_format_prompt_lists_choices() {
        plain();
        let survey = SurveyBlueprint::new("s1", "Short", Scale::new(1.0, 5.0, 1.0))
            .with_category(Category::new("c1", "Energy"))
            .with_prompt(Prompt::new("p1", "c1", "How rested are you?"));

        let text = ConsoleFormatter::format_prompt(&session_at(survey, 0));

        assert!(text.contains("[1/1] Energy"));
        assert!(text.contains("How rested are you?"));
        assert!(text.contains("(1 2 3 4 5)"));
    }

    #[test]
    fn test_format_prompt_shows_bounds_for_fine_scales() {
        plain();
        let survey = SurveyBlueprint::new("s1", "Fine", Scale::new(0.0, 100.0, 0.5))
            .with_category(Category::new("c1", "Energy"))
            .with_prompt(Prompt::new("p1", "c1", "Rate it"));

        let text = ConsoleFormatter::format_prompt(&session_at(survey, 0));

        assert!(text.contains("(0 to 100)"));
    }

    #[test]
    fn test_format_summary_shows_progress() {
        plain();
        let survey = default_survey();
        let mut answers = selfcheck_domain::Answers::new();
        answers.insert("p_energy".into(), 8.0);

        let text = ConsoleFormatter::format_summary(&survey, &compute_summary(&survey, &answers));

        assert!(text.contains("Answered: 1/3 (33%)"));
    }

    #[test]
    fn test_format_focus_points() {
        plain();
        let survey = default_survey();
        let focus = FocusState::default()
            .set_points("c_mood", 6.0)
            .set_points("c_energy", 3.0);

        let text = ConsoleFormatter::format_focus(&survey, &focus);
        assert!(text.contains("Focus (points)"));
        assert!(text.contains("  6  Mood"));
        assert!(text.contains("9 of 10 points allocated, 1 remaining"));
    }

    #[test]
    fn test_format_history_marks_state() {
        plain();
        let runs = vec![
            RunOverview {
                run_id: "r_2".into(),
                survey_id: "s_gone".into(),
                survey_title: None,
                started_at: 2_000,
                completed_at: None,
                answered_count: 1,
                total_count: 0,
                overall_avg: None,
            },
            RunOverview {
                run_id: "r_1".into(),
                survey_id: "s_default_v1".into(),
                survey_title: Some("Default Assessment".into()),
                started_at: 1_000,
                completed_at: Some(1_500),
                answered_count: 3,
                total_count: 3,
                overall_avg: Some(5.0),
            },
        ];

        let text = ConsoleFormatter::format_history(&runs);
        let lines: Vec<&str> = text.lines().filter(|l| l.contains("r_")).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("open") && lines[0].contains("s_gone"));
        assert!(lines[1].contains("done") && lines[1].contains("avg 5.00"));
        assert!(ConsoleFormatter::format_history(&[]).contains("No runs yet."));
    }

    #[test]
    fn test_format_json() {
        let json = ConsoleFormatter::format_json(&default_survey());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["surveyId"], "s_default_v1");
    }
}
