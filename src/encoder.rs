//! Tab-separated output layouts for aggregated specimens.
//!
//! Encoding happens in two steps: [`plan_outputs`] decides which files a
//! conversion produces and which specimens each lists, then
//! [`OutputPlan::write_to`] streams one file's header and locus rows.

use std::{
    fmt::{self, Write as _},
    io::{self, Write},
    str::FromStr,
};

use regex::Regex;

use crate::genotype::{ClassifiedLocus, MISSING_SINGLE, Mode};
use crate::specimen::Specimen;

/// Token written for each missing depth in the HAD layout.
pub const MISSING_DEPTH: &str = "NA";

/// Specimen names ending in `<digit>e<digits>` belong to offspring.
pub const DEFAULT_OFFSPRING_PATTERN: &str = r"\de\d*$";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PedigreeRole {
    Maternal,
    Offspring,
}

/// Decides the pedigree role of a specimen from its name.
pub trait RoleAssigner {
    fn role(&self, name: &str) -> PedigreeRole;
}

impl<F> RoleAssigner for F
where
    F: Fn(&str) -> PedigreeRole,
{
    fn role(&self, name: &str) -> PedigreeRole {
        self(name)
    }
}

/// Name-pattern role assignment: a match anywhere in the name marks offspring.
#[derive(Debug, Clone)]
pub struct OffspringPattern {
    regex: Regex,
}

impl OffspringPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for OffspringPattern {
    fn default() -> Self {
        Self::new(DEFAULT_OFFSPRING_PATTERN).expect("default offspring pattern compiles")
    }
}

impl FromStr for OffspringPattern {
    type Err = regex::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for OffspringPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RoleAssigner for OffspringPattern {
    fn role(&self, name: &str) -> PedigreeRole {
        if self.regex.is_match(name) {
            PedigreeRole::Offspring
        } else {
            PedigreeRole::Maternal
        }
    }
}

/// One output file: its name, layout and the specimens it lists.
#[derive(Debug, Clone)]
pub struct OutputPlan<'a> {
    file_name: String,
    mode: Mode,
    specimens: Vec<&'a Specimen>,
    loci: usize,
}

impl<'a> OutputPlan<'a> {
    fn new(file_name: String, mode: Mode, specimens: Vec<&'a Specimen>, loci: usize) -> Self {
        Self {
            file_name,
            mode,
            specimens,
            loci,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn specimens(&self) -> &[&'a Specimen] {
        &self.specimens
    }

    /// Output columns used by `specimen` in this layout.
    pub fn columns(&self, specimen: &Specimen) -> usize {
        if self.mode.is_fixed_width() || specimen.needs_two_columns() {
            2
        } else {
            1
        }
    }

    pub fn write_to<W>(&self, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        let mut line = String::new();

        for specimen in &self.specimens {
            for _ in 0..self.columns(specimen) {
                line.push_str(specimen.name());
                line.push('\t');
            }
        }
        write_line(&mut writer, &mut line)?;

        for index in 0..self.loci {
            for specimen in &self.specimens {
                if let Some(locus) = specimen.loci().get(index) {
                    push_locus(&mut line, locus, self.columns(specimen));
                }
            }
            write_line(&mut writer, &mut line)?;
        }

        writer.flush()
    }
}

/// Decide the files produced for `specimens` under `mode`.
///
/// Every plan writes one row per locus in `loci`, even when it lists no
/// specimens. `roles` splits fixed-width Colony output into maternal (`mat`)
/// and offspring (`off`) files; it is ignored by the other layouts. Both
/// Colony layouts drop specimens without informative data.
pub fn plan_outputs<'a>(
    specimens: &'a [Specimen],
    loci: usize,
    mode: Mode,
    stem: &str,
    roles: Option<&dyn RoleAssigner>,
) -> Vec<OutputPlan<'a>> {
    match mode {
        Mode::Had => vec![OutputPlan::new(
            format!("HAD{stem}.txt"),
            mode,
            specimens.iter().collect(),
            loci,
        )],
        Mode::ColonyFixed => {
            let retained = informative(specimens);
            match roles {
                Some(roles) => {
                    let (offspring, maternal): (Vec<_>, Vec<_>) = retained
                        .into_iter()
                        .partition(|s| roles.role(s.name()) == PedigreeRole::Offspring);
                    vec![
                        OutputPlan::new(format!("mat{stem}.txt"), mode, maternal, loci),
                        OutputPlan::new(format!("off{stem}.txt"), mode, offspring, loci),
                    ]
                }
                None => vec![OutputPlan::new(
                    format!("col{stem}.txt"),
                    mode,
                    retained,
                    loci,
                )],
            }
        }
        Mode::ColonyVariable => vec![OutputPlan::new(
            format!("COL{stem}.txt"),
            mode,
            informative(specimens),
            loci,
        )],
    }
}

fn informative(specimens: &[Specimen]) -> Vec<&Specimen> {
    specimens
        .iter()
        .filter(|specimen| {
            let keep = specimen.has_informative_data();
            if !keep {
                tracing::debug!(specimen = specimen.name(), "dropping specimen with no called loci");
            }
            keep
        })
        .collect()
}

fn push_token<T: fmt::Display>(line: &mut String, token: T, repeat: usize) {
    for _ in 0..repeat {
        write!(line, "{token}\t").ok();
    }
}

fn push_locus(line: &mut String, locus: &ClassifiedLocus, columns: usize) {
    match locus {
        ClassifiedLocus::Missing => push_token(line, MISSING_DEPTH, columns),
        ClassifiedLocus::DepthPair(first, second) => {
            push_token(line, first, 1);
            push_token(line, second, 1);
        }
        ClassifiedLocus::AlleleCallPair(first, second) => {
            push_token(line, first, 1);
            push_token(line, second, 1);
        }
        ClassifiedLocus::AlleleCallSingle(allele) => push_token(line, allele, columns),
        ClassifiedLocus::MissingSingle => push_token(line, MISSING_SINGLE, columns),
    }
}

fn write_line<W: Write>(writer: &mut W, line: &mut String) -> io::Result<()> {
    let end = line.trim_end_matches('\t').len();
    line.truncate(end);
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    line.clear();
    Ok(())
}
