//! Interactive questions for decisions missing from the command line.

use std::io::{BufRead, Write};

use arcstr::ArcStr;
use reticle::barcode::Barcode;
use reticle::{Error, Result};

/// Asks questions on `output` and reads answers from `input`.
///
/// Unrecognized answers are reported and the question is repeated.
/// Running out of input is an [`Error::Input`].
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self, question: &str) -> Result<String> {
        let io_err = |e: std::io::Error| Error::Input(format!("failed to read response: {e}"));
        write!(self.output, "{question}").map_err(io_err)?;
        self.output.flush().map_err(io_err)?;

        let mut line = String::new();
        if self.input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(Error::Input("unexpected end of input".to_string()));
        }
        Ok(line.trim().to_string())
    }

    /// Repeats `question` until `parse` accepts the answer.
    pub fn ask<T>(&mut self, question: &str, parse: impl Fn(&str) -> Result<T>) -> Result<T> {
        loop {
            let line = self.read_line(question)?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::debug!(response = %line, "rejected response");
                    writeln!(self.output, "Error: {e}. Please try again.")
                        .map_err(|e| Error::Input(e.to_string()))?;
                }
            }
        }
    }

    /// Asks whether the design is drawn at wafer scale.
    pub fn ask_wafer_scale(&mut self) -> Result<bool> {
        self.ask(
            "Is your design at [w]afer scale or [r]eticle scale? (w/r): ",
            parse_scale,
        )
    }

    /// Asks whether the design should be mirrored for the maskless aligner.
    pub fn ask_mirror(&mut self) -> Result<bool> {
        self.ask(
            "Will this design be fabricated on the MLA150? (y/n): ",
            parse_yes_no,
        )
    }

    /// Asks for the barcode label.
    pub fn ask_barcode(&mut self) -> Result<Barcode> {
        self.ask("Enter barcode (1-12 alphanumeric characters): ", Barcode::new)
    }

    /// Asks which of several top-level cells to place.
    pub fn ask_design_cell(&mut self, cells: &[ArcStr]) -> Result<ArcStr> {
        writeln!(self.output, "Multiple top-level cells found. Please choose one:")
            .map_err(|e| Error::Input(e.to_string()))?;
        for (i, cell) in cells.iter().enumerate() {
            writeln!(self.output, "  {}: {}", i + 1, cell)
                .map_err(|e| Error::Input(e.to_string()))?;
        }
        let question = format!("Enter number of the cell to merge (1-{}): ", cells.len());
        let index = self.ask(&question, |s| parse_choice(s, cells.len()))?;
        Ok(cells[index].clone())
    }
}

/// Parses a wafer/reticle scale answer. Returns `true` for wafer scale.
pub fn parse_scale(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "w" | "wafer" => Ok(true),
        "r" | "reticle" => Ok(false),
        _ => Err(Error::Input(format!(
            "unrecognized response `{s}`, expected 'w' or 'r'"
        ))),
    }
}

/// Parses a yes/no answer.
pub fn parse_yes_no(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err(Error::Input(format!(
            "unrecognized response `{s}`, expected 'y' or 'n'"
        ))),
    }
}

/// Parses a 1-based choice among `n` options into a 0-based index.
pub fn parse_choice(s: &str, n: usize) -> Result<usize> {
    let choice: usize = s
        .parse()
        .map_err(|_| Error::Input(format!("`{s}` is not a number")))?;
    if (1..=n).contains(&choice) {
        Ok(choice - 1)
    } else {
        Err(Error::Input(format!("{choice} is not between 1 and {n}")))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn answers_are_case_insensitive() {
        assert!(parse_scale("W").unwrap());
        assert!(!parse_scale("Reticle").unwrap());
        assert!(parse_yes_no("YES").unwrap());
        assert!(!parse_yes_no("n").unwrap());
    }

    #[test]
    fn bad_answers_are_reported_and_asked_again() {
        let mut p = prompter("maybe\nwafer\n");
        assert!(p.ask_wafer_scale().unwrap());

        let output = String::from_utf8(p.output).unwrap();
        assert_eq!(output.matches("(w/r)").count(), 2);
        assert!(output.contains("unrecognized response `maybe`"));
    }

    #[test]
    fn end_of_input_is_an_input_error() {
        let mut p = prompter("x\n");
        assert!(matches!(p.ask_mirror(), Err(Error::Input(_))));
    }

    #[test]
    fn invalid_barcodes_are_asked_again() {
        let mut p = prompter("\nthirteen-long\nab#\nrun 12\n");
        assert_eq!(p.ask_barcode().unwrap().as_str(), "RUN 12");

        let output = String::from_utf8(p.output).unwrap();
        assert_eq!(output.matches("Error:").count(), 3);
    }

    #[test]
    fn design_cell_is_chosen_by_number() {
        let cells = vec![ArcStr::from("chip"), ArcStr::from("test_structure")];
        let mut p = prompter("0\nsecond\n2\n");
        assert_eq!(p.ask_design_cell(&cells).unwrap(), "test_structure");

        let output = String::from_utf8(p.output).unwrap();
        assert!(output.contains("  1: chip"));
        assert!(output.contains("0 is not between 1 and 2"));
    }
}
