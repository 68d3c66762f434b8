use crate::api::QubitCount;
use crate::state::Coefficient;
use chumsky::prelude::*;
use tracing::{debug, warn};

/// One recognised `coefficient |bits>` term.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    /// Coefficient text as written, trimmed. Empty when the ket had none.
    pub raw_coefficient: String,
    pub coefficient: Coefficient,
    /// Basis bits, left-padded with zeros to the register width.
    pub bits: String,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub terms: Vec<Term>,
    /// Kets wider than the register, e.g. `|101>` for two qubits.
    pub invalid: Vec<String>,
    /// Number of kets seen, including the invalid ones.
    pub matched: usize,
}

impl ParseOutcome {
    pub fn matched_any(&self) -> bool {
        self.matched > 0
    }
}

/// Scans free text for `[±][coefficient] |bits>` terms, skipping anything
/// that is not part of a term. The coefficient is either a parenthesised
/// group or a bare decimal such as `0.5`, `1e-3` or `0.5i0.5`.
fn wavefunction_parser<'a>()
-> impl Parser<'a, &'a str, Vec<Option<(&'a str, &'a str)>>, extra::Err<Simple<'a, char>>> {
    let exponent = just('e')
        .then(one_of("+-").or_not())
        .then(one_of("0123456789").repeated().at_least(1));
    let imaginary = just('i').then(one_of("0123456789.+-").repeated().at_least(1));
    let number = one_of("0123456789.")
        .repeated()
        .at_least(1)
        .then(exponent.or_not())
        .then(imaginary.or_not())
        .to_slice();

    let grouped = just('(')
        .then(none_of(')').repeated().at_least(1))
        .then(just(')'))
        .to_slice();

    let coefficient = one_of("+-")
        .or_not()
        .then(text::whitespace())
        .then(grouped.or(number).or_not())
        .to_slice();

    let ket = just('|')
        .ignore_then(text::whitespace())
        .ignore_then(one_of("01").repeated().at_least(1).to_slice())
        .then_ignore(text::whitespace())
        .then_ignore(one_of(">⟩"));

    let term = coefficient.then_ignore(text::whitespace()).then(ket);

    term.map(Some)
        .or(any().to(None))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

/// Extracts the terms of `text` for a register of `qubits` qubits.
///
/// Kets longer than the register are reported in `invalid` and dropped;
/// shorter ones are zero-padded on the left. Never fails: text with no
/// recognisable term yields an empty outcome.
pub fn parse_wavefunction(text: &str, qubits: QubitCount) -> ParseOutcome {
    let width = qubits.get();
    let matches = wavefunction_parser()
        .parse(text)
        .into_output()
        .unwrap_or_default();

    let mut outcome = ParseOutcome::default();
    for (raw, bits) in matches.into_iter().flatten() {
        outcome.matched += 1;
        if bits.len() > width {
            warn!(basis = bits, width, "basis state wider than the register");
            outcome.invalid.push(format!("|{}>", bits));
            continue;
        }

        let padded = format!("{:0>width$}", bits, width = width);
        let Ok(index) = usize::from_str_radix(&padded, 2) else {
            continue;
        };
        let raw_coefficient = raw.trim().to_string();
        let coefficient = Coefficient::parse(&raw_coefficient);
        debug!(index, coefficient = %coefficient, "parsed term");

        outcome.terms.push(Term {
            raw_coefficient,
            coefficient,
            bits: padded,
            index,
        });
    }
    outcome
}
