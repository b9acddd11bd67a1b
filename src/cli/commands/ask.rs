//! Ask command - answer questions, once or in an interactive loop.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use console::style;

use super::index::{check_dimension, ensure_index};
use crate::config::Settings;
use crate::documents::SentenceSplitter;
use crate::embedding::{EmbeddingProvider, FastEmbedProvider};
use crate::error::RagError;
use crate::generation::{AnswerGenerator, OpenAiGenerator};
use crate::query::{Answer, QueryOrchestrator};
use crate::vector::VectorIndex;

const PROMPT: &str = "Stelle eine Frage (oder 'exit' zum Beenden): ";
const EXIT_WORD: &str = "exit";

/// Run the ask command.
///
/// With an index already on disk the API key is checked before the embedding
/// model loads. Otherwise the index is built first.
pub fn run(settings: &Settings, question: Option<String>) -> Result<()> {
    let index_ready = VectorIndex::new(&settings.index)
        .map_err(RagError::from)?
        .exists();
    let early_generator = if index_ready {
        Some(load_generator(settings)?)
    } else {
        None
    };

    let splitter = SentenceSplitter::new();
    let provider = FastEmbedProvider::from_config(&settings.embedding).map_err(RagError::from)?;
    ensure_index(settings, &splitter, &provider)?;

    let generator = match early_generator {
        Some(generator) => generator,
        None => load_generator(settings)?,
    };

    let index = VectorIndex::open(&settings.index).map_err(RagError::from)?;
    check_dimension(&index, &provider)?;
    let orchestrator = QueryOrchestrator::from_settings(index, provider, generator, settings);

    let stdout = std::io::stdout();
    match question {
        Some(question) => {
            let answer = orchestrator.answer(&question)?;
            print_answer(&mut stdout.lock(), &answer)?;
        }
        None => {
            let stdin = std::io::stdin();
            interactive_loop(&orchestrator, &mut stdin.lock(), &mut stdout.lock())?;
        }
    }
    Ok(())
}

fn load_generator(settings: &Settings) -> Result<OpenAiGenerator> {
    OpenAiGenerator::from_config(&settings.generation).map_err(|e| {
        tracing::error!(target: "generation", "{e}");
        RagError::from(e).into()
    })
}

/// Read questions until `exit` or an empty line, answering each one.
///
/// A failed question is reported and the loop continues.
pub fn interactive_loop<E, G, R, W>(
    orchestrator: &QueryOrchestrator<E, G>,
    input: &mut R,
    output: &mut W,
) -> Result<usize>
where
    E: EmbeddingProvider,
    G: AnswerGenerator,
    R: BufRead,
    W: Write,
{
    let mut answered = 0;
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("failed to read question")?;
        let question = line.trim();
        if read == 0 || is_exit(question) {
            break;
        }

        match orchestrator.answer(question) {
            Ok(answer) => {
                print_answer(output, &answer)?;
                answered += 1;
            }
            Err(e) => {
                tracing::error!(target: "query", "question failed: {e}");
                writeln!(output, "{} {e}\n", style("Fehler:").red().bold())?;
            }
        }
    }
    Ok(answered)
}

/// Whether `question` ends the session.
pub fn is_exit(question: &str) -> bool {
    let question = question.trim();
    question.is_empty() || question.eq_ignore_ascii_case(EXIT_WORD)
}

fn print_answer<W: Write>(output: &mut W, answer: &Answer) -> std::io::Result<()> {
    writeln!(output, "\n{}", style("Ähnlichste Textabschnitte:").cyan().bold())?;
    for chunk in &answer.context_chunks {
        writeln!(output, "{chunk}")?;
    }
    writeln!(output, "\n\n{}\n", style("Antwort:").cyan().bold())?;
    writeln!(output, "{}", answer.text)?;
    writeln!(output, "\n{}\n", "-".repeat(50))
}
