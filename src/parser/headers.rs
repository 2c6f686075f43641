// Level-2 header extraction

/// Collect the text of every `## ` header in document order.
///
/// `###` and deeper are not level-2 headers. Lines inside fenced code blocks
/// are ignored.
pub fn extract_headers(content: &str) -> Vec<String> {
    let mut headers = Vec::new();
    let mut fence: Option<Fence> = None;

    for line in content.lines() {
        let trimmed = line.trim_start();

        match (fence, Fence::parse(trimmed)) {
            (None, Some(opened)) => {
                fence = Some(opened);
                continue;
            }
            (Some(open), Some(candidate)) if open.is_closed_by(candidate) => {
                fence = None;
                continue;
            }
            (Some(_), _) => continue,
            (None, None) => {}
        }

        if let Some(text) = level_two_text(line) {
            headers.push(text);
        }
    }

    headers
}

/// A run of three or more backticks or tildes starting a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    ch: char,
    len: usize,
    /// Only whitespace follows the run
    bare: bool,
}

impl Fence {
    fn parse(line: &str) -> Option<Self> {
        let ch = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = line.chars().take_while(|c| *c == ch).count();
        if len < 3 {
            return None;
        }
        let bare = line[len * ch.len_utf8()..].trim().is_empty();
        Some(Self { ch, len, bare })
    }

    /// A closing fence repeats the opening character at least as many times
    fn is_closed_by(self, other: Fence) -> bool {
        other.ch == self.ch && other.len >= self.len && other.bare
    }
}

fn level_two_text(line: &str) -> Option<String> {
    let rest = line.strip_prefix("##")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let text = rest.trim();
    let stripped = text.trim_end_matches('#');
    // a closing sequence must be separated by a space (`## C#` keeps its hash)
    if stripped.is_empty() || stripped.ends_with(char::is_whitespace) {
        Some(stripped.trim_end().to_string())
    } else {
        Some(text.to_string())
    }
}
