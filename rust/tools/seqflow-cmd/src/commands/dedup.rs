use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use itertools::Itertools;
use seqflow_seq::{SequenceExt, from_iter};

pub fn run(file: Option<String>) -> Result<()> {
    let text = match &file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    let values = parse_values(&text)?;
    let dedup = from_iter(values.clone()).dedup().collect_vec();
    let unique = from_iter(values).unique().collect_vec();
    println!("dedup:  {}", dedup.iter().join(" "));
    println!("unique: {}", unique.iter().join(" "));
    Ok(())
}

fn parse_values(text: &str) -> Result<Vec<i64>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<i64>()
                .with_context(|| format!("Not an integer: '{token}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_values("1 1\n2 -3").unwrap(), vec![1, 1, 2, -3]);
        assert!(parse_values("1 x").is_err());
        assert!(parse_values("").unwrap().is_empty());
    }
}
