use anyhow::{Context, Result};
use chatbot::{ChatService, GeminiService, QuizSession, ServiceConfig, Summary, UploadedFile};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Summarize an image or PDF, then take a quiz on it
#[derive(Parser, Debug)]
#[command(name = "chatbot", version)]
struct Args {
    /// Image (jpg, jpeg, png) or PDF to read
    file: PathBuf,

    /// Question or request to send along with the file
    #[arg(short, long, default_value = "")]
    prompt: String,

    /// Print the summary and skip the quiz
    #[arg(long)]
    summary_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the logger so RUST_LOG set there applies
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let config = ServiceConfig::from_env();
    config.warn_if_unconfigured();
    let service = ChatService::new(Arc::new(GeminiService::new(config)));

    let data = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let file = UploadedFile::new(name, None, data);

    if args.summary_only {
        let payload = service.extract(Some(file)).await?;
        let summary = service.summarize(payload, &args.prompt).await;
        print_summary(&summary);
        return Ok(());
    }

    let result = service.summarize_and_quiz(Some(file), &args.prompt).await?;
    print_summary(&result.summary);

    if let Some(error) = &result.quiz.error {
        eprintln!("\nQuiz unavailable: {}", error);
        return Ok(());
    }

    let mut session = QuizSession::new();
    session.start_new_quiz(result.summary, result.quiz.questions);
    run_quiz(&mut session).await?;

    session.submit()?;
    let report = session.grade()?;

    println!("\nYour score: {}/{}", report.score, report.total);
    for (i, r) in report.results.iter().enumerate() {
        let mark = if r.is_correct { "correct" } else { "wrong" };
        println!("\nQ{}: {}", i + 1, r.question);
        println!("  Your answer:    {}", r.user_answer_text());
        println!("  Correct answer: {} ({})", r.correct_answer, mark);
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    match summary {
        Summary::Generated(text) => println!("Summary\n-------\n{}", text),
        Summary::Failed(message) => eprintln!("{}", message),
    }
}

async fn run_quiz(session: &mut QuizSession) -> Result<()> {
    let questions = session.quiz().map(<[_]>::to_vec).unwrap_or_default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("\nQuiz: answer with the option number, or press enter to skip");
    for (index, question) in questions.iter().enumerate() {
        println!("\n{}. {}", index + 1, question.question);
        for (n, option) in question.options.iter().enumerate() {
            println!("   {}) {}", n + 1, option);
        }

        loop {
            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            match line.parse::<usize>() {
                Ok(choice) if choice >= 1 => match session.record_answer(index, choice - 1) {
                    Ok(()) => break,
                    Err(e) => println!("   {}", e),
                },
                _ => println!("   Enter a number from 1 to {}", question.options.len()),
            }
        }
    }

    Ok(())
}
