//! Heading numbering state.
//!
//! Numbered headings carry a `seq` (an explicit number or `"auto"`) and a `seq_level`. Counters
//! are kept per depth for the duration of one transform: a heading at depth `d` keeps the
//! counters of depths `1..=d`, clears everything deeper, then sets its own counter.
//!
//! With `seq_level == "auto"` the prefix is the chain of all counters up to the heading's depth
//! (`1.2. `); otherwise only the heading's own counter is used (`2. `).

const AUTO: &str = "auto";

/// Per-depth heading counters of one transform call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingSequences {
    counters: Vec<Option<String>>,
}

impl HeadingSequences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a numbered heading and return the text prefix to prepend to it.
    pub fn advance(&mut self, depth: u8, seq: &str, seq_level: Option<&str>) -> String {
        let depth = usize::from(depth.max(1));
        self.counters.truncate(depth);
        self.counters.resize(depth, None);

        let value = if seq == AUTO {
            let previous = self.counters[depth - 1]
                .as_deref()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0);
            (previous + 1).to_string()
        } else {
            seq.to_string()
        };
        self.counters[depth - 1] = Some(value.clone());

        if seq_level == Some(AUTO) {
            let chain: Vec<&str> = self.counters.iter().flatten().map(String::as_str).collect();
            format!("{}. ", chain.join("."))
        } else {
            format!("{value}. ")
        }
    }

    /// Current counter at `depth`, if any heading set it.
    pub fn current(&self, depth: u8) -> Option<&str> {
        let index = usize::from(depth).checked_sub(1)?;
        self.counters.get(index)?.as_deref()
    }
}
