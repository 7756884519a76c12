use std::io::{BufRead, Write};

use anyhow::{bail, ensure, Context, Result};
use log::*;
use perc::Percolation;

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub row: usize,
    pub col: usize,
}

/// A grid size followed by the sites to open, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub n: usize,
    pub steps: Vec<Step>,
}

/// Reads a script: the first non-empty line holds the grid size, every
/// following non-empty line holds a row and a column separated by
/// whitespace.
pub fn parse(reader: impl BufRead) -> Result<Script> {
    let mut n = None;
    let mut steps = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("failed to read line {number}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if n.is_none() {
            let size = line
                .parse::<usize>()
                .with_context(|| format!("line {number}: invalid grid size {line:?}"))?;
            n = Some(size);
            continue;
        }

        let tokens = line.split_whitespace().collect::<Vec<_>>();
        ensure!(
            tokens.len() == 2,
            "line {number}: expected a row and a column, got {line:?}"
        );
        let row = tokens[0]
            .parse::<usize>()
            .with_context(|| format!("line {number}: invalid row {:?}", tokens[0]))?;
        let col = tokens[1]
            .parse::<usize>()
            .with_context(|| format!("line {number}: invalid column {:?}", tokens[1]))?;

        steps.push(Step {
            line: number,
            row,
            col,
        });
    }

    match n {
        Some(n) => Ok(Script { n, steps }),
        None => bail!("script is empty"),
    }
}

/// Opens every site of the script, reporting after each one whether the
/// grid percolates.
pub fn run(script: &Script, mut out: impl Write) -> Result<Percolation> {
    let mut grid = Percolation::new(script.n)?;
    writeln!(out, "percolates: {}", grid.percolates())?;

    for step in &script.steps {
        grid.open(step.row, step.col).with_context(|| format!("line {}", step.line))?;
        let full = grid.is_full(step.row, step.col)?;
        debug!("opened ({}, {}), full: {full}", step.row, step.col);
        writeln!(
            out,
            "{} {} -> percolates: {}",
            step.row,
            step.col,
            grid.percolates()
        )?;
    }

    writeln!(out, "open sites: {}", grid.number_of_open_sites())?;
    Ok(grid)
}

////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(line: usize, row: usize, col: usize) -> Step {
        Step { line, row, col }
    }

    #[test]
    fn parse_script() {
        let script = parse("3\n1 1\n\n  2\t1 \n3 1\n".as_bytes()).unwrap();
        assert_eq!(
            script,
            Script {
                n: 3,
                steps: vec![step(2, 1, 1), step(4, 2, 1), step(5, 3, 1)],
            }
        );
    }

    #[test]
    fn parse_errors() {
        assert!(parse("".as_bytes()).is_err());
        assert!(parse("x\n".as_bytes()).is_err());

        let err = parse("2\n1 1\n1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("line 3"), "{err}");

        let err = parse("2\n1 a\n".as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("line 2"), "{err}");
    }

    #[test]
    fn run_script() {
        let script = parse("2\n1 1\n1 1\n2 1\n".as_bytes()).unwrap();
        let mut out = Vec::new();
        let grid = run(&script, &mut out).unwrap();

        assert!(grid.percolates());
        assert_eq!(grid.number_of_open_sites(), 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "percolates: false\n\
             1 1 -> percolates: false\n\
             1 1 -> percolates: false\n\
             2 1 -> percolates: true\n\
             open sites: 2\n"
        );
    }

    #[test]
    fn run_out_of_range() {
        let script = parse("2\n1 1\n3 1\n".as_bytes()).unwrap();
        let err = run(&script, Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "line 3");
        assert_eq!(
            err.root_cause().to_string(),
            "site (3, 1) is outside of the 2x2 grid"
        );
    }

    #[test]
    fn run_empty_grid() {
        let script = parse("0\n".as_bytes()).unwrap();
        assert!(run(&script, Vec::new()).is_err());
    }
}
