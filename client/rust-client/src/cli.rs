//! Terminal front-end over the participant views.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;

use crate::access::{resolve, Area, RouteDecision};
use crate::api::QuizListFilter;
use crate::gate::{format_duration, StartSummary};
use crate::models::attempt::AttemptQuestion;
use crate::models::{AttemptId, CategoryId, OptionId, QuestionId, QuizId};
use crate::navigator::AttemptSession;
use crate::services::attempt_service::Entry;
use crate::services::quiz_board::{BoardSnapshot, QuizBoardView};
use crate::services::AppState;
use crate::status::StatusFilter;

#[derive(Debug, Parser)]
#[command(name = "quizportal-client", about = "Take quizzes from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the signed-in profile and its home route
    Whoami,
    /// List available quizzes with their status and action
    Quizzes {
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        search: Option<String>,
        /// Keep the list live and reprint it on every clock tick
        #[arg(long)]
        watch: bool,
    },
    /// Start (or resume) a quiz
    Start {
        quiz: QuizId,
        /// Skip the confirmation summary
        #[arg(long, short)]
        yes: bool,
    },
    /// Show an attempt's questions
    Attempt {
        attempt: AttemptId,
        /// Question to display, defaults to the first one
        #[arg(long)]
        question: Option<QuestionId>,
    },
    /// Choose an option for a question of an attempt
    Answer {
        attempt: AttemptId,
        question: QuestionId,
        option: OptionId,
    },
}

pub async fn run(cli: Cli, state: &AppState) -> Result<()> {
    match cli.command {
        Command::Whoami => whoami(state).await,
        Command::Quizzes {
            filter,
            category,
            search,
            watch,
        } => {
            let list_filter = QuizListFilter {
                category: category.map(CategoryId),
                search,
            };
            quizzes(state, list_filter, filter, watch).await
        }
        Command::Start { quiz, yes } => start(state, quiz, yes).await,
        Command::Attempt { attempt, question } => show_attempt(state, attempt, question).await,
        Command::Answer {
            attempt,
            question,
            option,
        } => answer(state, attempt, question, option).await,
    }
}

async fn whoami(state: &AppState) -> Result<()> {
    let profile = state
        .backend
        .current_user()
        .await
        .context("Failed to fetch profile")?;
    let home = crate::access::home_for(&profile, &state.config.routes);
    println!("{} ({}) -> {}", profile.display_name(), profile.username, home);
    Ok(())
}

/// Participants only: staff accounts belong to the admin screens
async fn ensure_participant(state: &AppState) -> Result<()> {
    let profile = state.backend.current_user().await.ok();
    match resolve(profile.as_ref(), Area::User, &state.config.routes) {
        RouteDecision::Allow => Ok(()),
        RouteDecision::Redirect(to) => bail!("Not a participant session, go to {}", to),
    }
}

async fn quizzes(
    state: &AppState,
    list_filter: QuizListFilter,
    filter: StatusFilter,
    watch: bool,
) -> Result<()> {
    ensure_participant(state).await?;
    state.ticker.tick();

    let mut board = QuizBoardView::open(
        state.backend.clone(),
        &state.ticker,
        list_filter,
        &state.config.routes.user_home,
    )
    .await?;

    print!("{}", render_board(&board.snapshot(), filter));
    if !watch {
        return Ok(());
    }

    let _ticker = state.ticker.spawn(state.config.tick_interval());
    loop {
        tokio::select! {
            snapshot = board.changed() => match snapshot {
                Some(snapshot) => print!("\x1B[2J\x1B[H{}", render_board(&snapshot, filter)),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

pub fn render_board(snapshot: &BoardSnapshot, filter: StatusFilter) -> String {
    let mut out = String::new();
    for card in snapshot.filtered(filter) {
        let quiz = &card.quiz;
        let _ = writeln!(
            out,
            "#{:<5} {:<32} {:<9} {:>10}{}",
            quiz.id,
            quiz.title,
            card.status,
            card.action.label,
            if card.action.enabled { "" } else { " (disabled)" }
        );
        let _ = writeln!(
            out,
            "       start {} | {} | end {}",
            quiz.start_time.format("%d/%m/%Y, %H:%M"),
            format_duration(quiz.duration),
            quiz.end_time.format("%d/%m/%Y, %H:%M"),
        );
    }
    if out.is_empty() {
        out.push_str("No quizzes\n");
    }
    out
}

async fn start(state: &AppState, quiz_id: QuizId, yes: bool) -> Result<()> {
    let (_, quiz) = futures::try_join!(ensure_participant(state), async {
        state
            .backend
            .get_user_quiz(quiz_id)
            .await
            .with_context(|| format!("Failed to load quiz {}", quiz_id))
    })?;
    let now = state.ticker.tick();
    let attempts = state.attempts();

    let view = match attempts.activate(&quiz, now).await? {
        Entry::Opened(view) => view,
        Entry::Unavailable => {
            bail!("Quiz {} cannot be started right now", quiz_id)
        }
        Entry::NeedsConfirmation(quiz_id) => {
            print!("{}", render_summary(&StartSummary::from(&quiz)));
            if !yes {
                println!("Run again with --yes to start.");
                return Ok(());
            }
            attempts
                .start(quiz_id)
                .await
                .with_context(|| format!("Failed to start quiz {}", quiz_id))?
        }
    };

    print!("{}", render_session(view.session(), now));
    Ok(())
}

pub fn render_summary(summary: &StartSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary.title);
    if let Some(category) = &summary.category {
        let _ = writeln!(out, "Category: {}", category);
    }
    if let Some(description) = &summary.description {
        let _ = writeln!(out, "{}", description);
    }
    let _ = writeln!(out, "Total questions: {}", summary.total_questions);
    for group in &summary.groups {
        let _ = writeln!(out, "    {}", group);
    }
    let _ = writeln!(out, "Duration: {}", summary.duration);
    out
}

async fn show_attempt(
    state: &AppState,
    attempt: AttemptId,
    question: Option<QuestionId>,
) -> Result<()> {
    let mut view = state.attempts().open(attempt).await?;
    if let Some(question) = question {
        view.select_question(question)?;
    }
    print!("{}", render_session(view.session(), state.ticker.tick()));
    Ok(())
}

async fn answer(
    state: &AppState,
    attempt: AttemptId,
    question: QuestionId,
    option: OptionId,
) -> Result<()> {
    let mut view = state.attempts().open(attempt).await?;
    view.select_question(question)?;
    if let Some(report) = view.choose_option(question, option)? {
        // The process exits right after, so give the report its chance to land
        report.await.context("Choice report task failed")?;
    }
    print!("{}", render_session(view.session(), state.ticker.tick()));
    Ok(())
}

pub fn render_session(session: &AttemptSession, now: chrono::DateTime<chrono::Utc>) -> String {
    let mut out = String::new();
    let attempt = session.attempt();
    let remaining = session.remaining(now).num_seconds();

    let _ = writeln!(
        out,
        "{} | attempt #{} | {}/{} answered | {:02}:{:02}:{:02} left",
        attempt.quiz.title,
        attempt.id,
        session.answered_count(),
        attempt.questions.len(),
        remaining / 3600,
        (remaining % 3600) / 60,
        remaining % 60,
    );

    for section in session.sections() {
        if let Some(group) = &section.group {
            let _ = writeln!(out, "[{}]", group.title);
        }
        let index: Vec<String> = section
            .questions
            .iter()
            .map(|id| {
                let answered = session.question(*id).is_some_and(AttemptQuestion::is_answered);
                let marker = if Some(*id) == session.current_id() {
                    ">"
                } else if answered {
                    "*"
                } else {
                    " "
                };
                format!("{}{}", marker, id)
            })
            .collect();
        let _ = writeln!(out, "  {}", index.join(" "));
    }

    match session.current_question() {
        Some(question) => {
            let _ = writeln!(
                out,
                "\nQ{}: {}",
                question.question_order,
                question.body_text.as_deref().unwrap_or("[image]")
            );
            for option in &question.options {
                let _ = writeln!(
                    out,
                    "  [{}] {} {}",
                    if option.selected { "x" } else { " " },
                    option.id,
                    option.body_text.as_deref().unwrap_or("[image]")
                );
            }
        }
        None => out.push_str("\nThis attempt has no questions\n"),
    }
    out
}
