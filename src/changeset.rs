use std::num::NonZeroUsize;

/// which entries of `git status` are uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeScope {
    /// added, modified, deleted and untracked files
    #[default]
    All,
    /// untracked files only; commits are limited to the batch's paths so
    /// tracked changes staged beforehand stay staged
    UntrackedOnly,
}

/// a single entry of `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub index: char,
    pub worktree: char,
    pub path: String,
}

impl FileChange {
    pub fn is_untracked(&self) -> bool {
        self.index == '?' && self.worktree == '?'
    }

    /// whether `git add` is needed; fully staged entries (including staged
    /// deletions, which `git add` rejects) are already in the index
    pub fn needs_staging(&self) -> bool {
        self.worktree != ' '
    }
}

/// ordered set of changed files, as emitted by git
#[derive(Debug, Default)]
pub struct ChangeSet {
    pub files: Vec<FileChange>,
}

impl ChangeSet {
    /// parse `git status --porcelain` output, keeping entries in `scope`
    pub fn from_porcelain(output: &str, scope: ChangeScope) -> Self {
        let files = output
            .lines()
            .filter_map(parse_line)
            .filter(|file| scope == ChangeScope::All || file.is_untracked())
            .collect();
        Self { files }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// parse one porcelain line: two status chars, a space, then the path
fn parse_line(line: &str) -> Option<FileChange> {
    let mut chars = line.chars();
    let index = chars.next()?;
    let worktree = chars.next()?;
    let rest = line.get(3..).filter(|rest| !rest.is_empty())?;

    // renames and copies are reported as "old -> new"
    let path = if matches!(index, 'R' | 'C') {
        rest.rsplit_once(" -> ").map_or(rest, |(_, new)| new)
    } else {
        rest
    };

    Some(FileChange {
        index,
        worktree,
        path: unquote(path),
    })
}

/// undo git's C-style quoting of unusual paths
fn unquote(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(byte) = iter.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        match iter.next() {
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'n') => bytes.push(b'\n'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'v') => bytes.push(0x0b),
            Some(digit @ b'0'..=b'7') => {
                // octal escape, up to three digits
                let mut value = u32::from(digit - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&next @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(next - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(u8::try_from(value).unwrap_or(u8::MAX));
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// split `items` into consecutive slices of at most `batch_size` elements
pub fn partition<T>(items: &[T], batch_size: NonZeroUsize) -> Vec<&[T]> {
    items.chunks(batch_size.get()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn paths(changeset: &ChangeSet) -> Vec<&str> {
        changeset.files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_parse_mixed_status() {
        let output = " M src/main.rs\nD  old.txt\n?? notes/todo.md\nA  added.rs\n";
        let changeset = ChangeSet::from_porcelain(output, ChangeScope::All);

        assert_eq!(
            paths(&changeset),
            ["src/main.rs", "old.txt", "notes/todo.md", "added.rs"]
        );
        assert_eq!(changeset.files[0].index, ' ');
        assert_eq!(changeset.files[0].worktree, 'M');
        assert!(changeset.files[2].is_untracked());
    }

    #[test]
    fn test_parse_untracked_only() {
        let output = " M tracked.rs\n?? new_a.rs\n?? new_b.rs\n";
        let changeset = ChangeSet::from_porcelain(output, ChangeScope::UntrackedOnly);

        assert_eq!(paths(&changeset), ["new_a.rs", "new_b.rs"]);
    }

    #[test]
    fn test_parse_rename_uses_new_path() {
        let changeset = ChangeSet::from_porcelain("R  before.txt -> after.txt\n", ChangeScope::All);

        assert_eq!(paths(&changeset), ["after.txt"]);
    }

    #[test]
    fn test_needs_staging() {
        let output = "D  gone.txt\nA  staged.rs\nAM half.rs\n D removed.rs\n?? new.rs\n";
        let changeset = ChangeSet::from_porcelain(output, ChangeScope::All);

        let unstaged: Vec<&str> = changeset
            .files
            .iter()
            .filter(|f| f.needs_staging())
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(unstaged, ["half.rs", "removed.rs", "new.rs"]);
    }

    #[test]
    fn test_parse_skips_blank_and_short_lines() {
        let changeset = ChangeSet::from_porcelain("\n??\n?? \n M a.rs\n\n", ChangeScope::All);

        assert_eq!(paths(&changeset), ["a.rs"]);
    }

    #[test]
    fn test_parse_empty_output() {
        let changeset = ChangeSet::from_porcelain("", ChangeScope::All);

        assert!(changeset.is_empty());
        assert_eq!(changeset.len(), 0);
    }

    #[test]
    fn test_unquote_paths() {
        assert_eq!(unquote("plain.txt"), "plain.txt");
        assert_eq!(unquote("\"with space.txt\""), "with space.txt");
        assert_eq!(unquote("\"tab\\there\""), "tab\there");
        assert_eq!(unquote("\"quote\\\"d\""), "quote\"d");
        assert_eq!(unquote("\"back\\\\slash\""), "back\\slash");
        // "é" is 0xc3 0xa9
        assert_eq!(unquote("\"caf\\303\\251.txt\""), "café.txt");
    }

    #[test]
    fn test_partition_uneven() {
        let items: Vec<usize> = (0..120).collect();
        let batches = partition(&items, size(50));

        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, [50, 50, 20]);
        assert_eq!(batches.concat(), items);
    }

    #[test]
    fn test_partition_counts_and_order() {
        for n in 0..40 {
            let items: Vec<usize> = (0..n).collect();
            for b in 1..12 {
                let batches = partition(&items, size(b));
                assert_eq!(batches.len(), n.div_ceil(b), "n={n} b={b}");
                assert!(batches.iter().all(|batch| !batch.is_empty() && batch.len() <= b));
                assert_eq!(batches.concat(), items, "n={n} b={b}");
            }
        }
    }

    #[test]
    fn test_partition_empty() {
        let items: Vec<String> = Vec::new();
        assert!(partition(&items, size(50)).is_empty());
    }
}
