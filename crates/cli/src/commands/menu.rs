//! Interactive console menu

use anyhow::Result;
use dialoguer::Input;
use predictor_lib::{
    predictor::{PredictionResult, PredictorKind, PredictorRegistry},
    FeatureRecord, PredictError,
};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Source of the answers typed at the console
pub trait Prompter {
    /// Ask for one value under `label`; `None` once input has ended
    fn ask(&mut self, output: &mut dyn Write, label: &str) -> Result<Option<String>>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn ask(&mut self, output: &mut dyn Write, label: &str) -> Result<Option<String>> {
        (**self).ask(output, label)
    }
}

/// Line editing prompts on an attached terminal
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, output: &mut dyn Write, label: &str) -> Result<Option<String>> {
        // menu text must land before the prompt
        output.flush()?;
        match Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => Ok(Some(line)),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Plain `label: ` prompts over a line reader, for piped input
pub struct LinePrompter<R> {
    input: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn ask(&mut self, output: &mut dyn Write, label: &str) -> Result<Option<String>> {
        write!(output, "{}: ", label)?;
        output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Menu choice read from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Predict(PredictorKind),
    Exit,
}

fn parse_choice(line: &str) -> Option<Choice> {
    match line.trim() {
        "1" => Some(Choice::Predict(PredictorKind::Summary)),
        "2" => Some(Choice::Predict(PredictorKind::PrecipType)),
        "3" => Some(Choice::Predict(PredictorKind::Temperature)),
        "4" => Some(Choice::Exit),
        _ => None,
    }
}

/// Menu loop over a prompter and an output stream
pub struct ConsoleSession<'a, P, W> {
    predictors: &'a PredictorRegistry,
    prompter: P,
    output: W,
}

impl<'a, P: Prompter, W: Write> ConsoleSession<'a, P, W> {
    pub fn new(predictors: &'a PredictorRegistry, prompter: P, output: W) -> Self {
        Self {
            predictors,
            prompter,
            output,
        }
    }

    /// Run until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "\nChoose a model to use:")?;
            for (index, kind) in PredictorKind::ALL.iter().enumerate() {
                writeln!(self.output, "{}. {} Predictor", index + 1, kind.display_name())?;
            }
            writeln!(self.output, "4. Exit")?;

            let Some(line) = self.prompt("Enter your choice (1-4)")? else {
                return Ok(());
            };

            match parse_choice(&line) {
                Some(Choice::Predict(kind)) => {
                    if !self.predict(kind)? {
                        return Ok(());
                    }
                }
                Some(Choice::Exit) => {
                    writeln!(self.output, "Exiting...")?;
                    return Ok(());
                }
                None => writeln!(
                    self.output,
                    "Invalid choice. Please enter a number between 1 and 4."
                )?,
            }
        }
    }

    /// Collect one variant's fields and print the outcome.
    /// Returns false when input ended mid-prompt.
    fn predict(&mut self, kind: PredictorKind) -> Result<bool> {
        writeln!(
            self.output,
            "\nEnter the required parameters for {} Prediction:",
            kind.display_name()
        )?;

        let outcome = match self.collect(kind)? {
            None => return Ok(false),
            Some(Ok(record)) => self.predictors.predict(kind, &record),
            Some(Err(e)) => Err(e),
        };

        self.report(kind, outcome)?;
        Ok(true)
    }

    /// Prompt for each field in order, stopping at the first bad value
    fn collect(&mut self, kind: PredictorKind) -> Result<Option<Result<FeatureRecord, PredictError>>> {
        let mut record = FeatureRecord::new();
        for field in kind.contract().fields() {
            let Some(raw) = self.prompt(field.prompt)? else {
                return Ok(None);
            };
            match field.coerce(&raw) {
                Ok(value) => record.insert(field.name, value),
                Err(e) => return Ok(Some(Err(e))),
            }
        }
        Ok(Some(Ok(record)))
    }

    fn report(&mut self, kind: PredictorKind, outcome: Result<PredictionResult, PredictError>) -> Result<()> {
        match outcome {
            Ok(result) => writeln!(self.output, "\n{}", result.headline())?,
            Err(e) if e.is_input_error() => writeln!(self.output, "Invalid input: {}", e)?,
            Err(e) => {
                debug!(predictor = %kind, error = %e, "Console prediction failed");
                writeln!(self.output, "Prediction failed: {}", e)?
            }
        }
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        self.prompter.ask(&mut self.output, label)
    }
}
