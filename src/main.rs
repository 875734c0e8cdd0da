use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use learnbot::ai::GeminiClient;
use learnbot::models::{Config, Mode, OptionLabel};
use learnbot::quiz::{Grade, QuizAttempt};
use learnbot::session::StudySession;
use learnbot::subjects::Catalogue;
use learnbot::tutor::Tutor;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "learnbot")]
#[command(about = "Your AI-powered computer science tutor")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the built-in subjects and topics.
    Subjects,
    /// Read a structured explanation of a topic.
    Learn { subject: String, topic: String },
    /// Take a five-question multiple-choice quiz.
    Test {
        subject: String,
        topic: String,
        /// Print the validated questions as JSON instead of quizzing.
        #[arg(long)]
        json: bool,
    },
    /// Ask a single question about a topic.
    Ask {
        subject: String,
        topic: String,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Chat about a topic until end of input or `/quit`.
    Chat { subject: String, topic: String },
}

/// Accepts `a`, `B`, `c)` and similar.
fn parse_answer(input: &str) -> Option<OptionLabel> {
    let trimmed = input.trim().trim_end_matches(')').to_ascii_uppercase();
    trimmed.parse().ok()
}

fn grade_label(grade: Grade) -> &'static str {
    match grade {
        Grade::Excellent => "Excellent work!",
        Grade::Passing => "Good effort, a little more review will help.",
        Grade::NeedsReview => "Keep studying and try again.",
    }
}

fn warn_if_unknown(catalogue: &Catalogue, subject: &str, topic: &str) {
    if !catalogue.contains(subject, topic) {
        warn!(
            "'{}' / '{}' is not in the built-in catalogue; continuing anyway",
            subject, topic
        );
    }
}

async fn prompt_line(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    Ok(lines.next_line().await?)
}

async fn run_quiz(attempt: &mut QuizAttempt) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let total = attempt.len();

    for index in 0..total {
        let item = attempt.items()[index].clone();
        println!("\nQuestion {} of {}", index + 1, total);
        println!("{}", item.question);
        for option in &item.options {
            println!("  {}", option);
        }

        let label = loop {
            match prompt_line(&mut lines, "Your answer (A-D): ").await? {
                None => {
                    println!();
                    return Ok(());
                }
                Some(input) => match parse_answer(&input) {
                    Some(label) => break label,
                    None => println!("Please answer with A, B, C or D."),
                },
            }
        };

        attempt.select(index, label)?;
        if attempt.is_correct(index) == Some(true) {
            println!("Correct!");
        } else {
            println!("Incorrect. The answer is {}", item.correct_option());
        }
        println!("{}", item.explanation);
    }

    Ok(())
}

async fn run(args: CliArgs) -> Result<()> {
    let catalogue = Catalogue::builtin()?;

    if let Command::Subjects = args.command {
        for subject in catalogue.subjects() {
            println!("{}", subject.name);
            for topic in &subject.topics {
                println!("  {}", topic);
            }
        }
        return Ok(());
    }

    let config = Config::from_env()?;
    let gateway = GeminiClient::from_config(&config);
    info!("Using Gemini model {}", gateway.model());
    let mut session = StudySession::new(Tutor::new(Box::new(gateway)));

    match args.command {
        Command::Subjects => {}
        Command::Learn { subject, topic } => {
            warn_if_unknown(&catalogue, &subject, &topic);
            session.select(Some(subject), Some(topic));
            session.load_content().await;
            println!("{}", session.learn_content());
            if let Some(e) = session.last_error() {
                bail!("{}", e);
            }
        }
        Command::Test {
            subject,
            topic,
            json,
        } => {
            warn_if_unknown(&catalogue, &subject, &topic);
            session.select(Some(subject), Some(topic));
            session.set_mode(Mode::Test);
            session.load_content().await;

            if session.quiz().is_empty() {
                bail!(
                    "Failed to generate valid quiz questions: {}",
                    session.last_error().unwrap_or("no questions returned")
                );
            }

            if json {
                println!("{}", serde_json::to_string_pretty(session.quiz())?);
                return Ok(());
            }

            let mut attempt = session.start_quiz();
            run_quiz(&mut attempt).await?;
            if attempt.is_complete() {
                println!(
                    "\nTest complete! You got {} out of {} questions correct ({}%).",
                    attempt.correct_count(),
                    attempt.len(),
                    attempt.score_percent()
                );
                println!("{}", grade_label(attempt.grade()));
            }
        }
        Command::Ask {
            subject,
            topic,
            question,
        } => {
            warn_if_unknown(&catalogue, &subject, &topic);
            session.select(Some(subject), Some(topic));
            let question = question.join(" ");
            if let Some(reply) = session.send_message(&question).await {
                println!("{}", reply.content);
            }
            if let Some(e) = session.last_error() {
                bail!("{}", e);
            }
        }
        Command::Chat { subject, topic } => {
            warn_if_unknown(&catalogue, &subject, &topic);
            println!("Chatting about {} in {}. Type /quit to leave.", topic, subject);
            session.select(Some(subject), Some(topic));

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = prompt_line(&mut lines, "> ").await? {
                let message = line.trim();
                if message.is_empty() {
                    continue;
                }
                if message == "/quit" {
                    break;
                }
                if let Some(reply) = session.send_message(message).await {
                    println!("{}\n", reply.content);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "learnbot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    if let Err(e) = run(args).await {
        tracing::error!("learnbot failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
