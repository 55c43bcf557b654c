//! Two-pass changelog transformation.
//!
//! Pass 1 scans every block and collects the distinct ticket ids. The
//! ids are resolved in one concurrent batch. Pass 2 scans the document
//! again, copying lines outside blocks verbatim and replacing each block
//! with its rendered sections as soon as the block closes.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info};

use crate::category::{Block, Categorizer, Category, Entry};
use crate::config::{ChangelogConfig, Config};
use crate::issue::{IssueLookup, IssueMap, IssueResolver};
use crate::metrics::{BLOCKS_RENDERED, ENTRIES_RENDERED};
use crate::render::Renderer;
use crate::scanner::{BlockScanner, LineKind};
use crate::ticket::{PatternError, ReferencePattern, TicketExtractor, TicketSet};

/// Error type for pipeline runs. All variants are fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Changelog could not be opened or read.
    #[error("Failed to read changelog {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output could not be cleared or written.
    #[error("Failed to write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input and output resolve to the same file.
    #[error("Output {output} is the input changelog {input}")]
    OutputIsInput { input: PathBuf, output: PathBuf },

    /// Configured pattern is invalid.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl PipelineError {
    fn input(path: &Path, source: io::Error) -> Self {
        Self::InputUnreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    fn output(path: &Path, source: io::Error) -> Self {
        Self::Output {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure of the rendering pass, by the side that failed.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading the changelog failed.
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// Writing the output failed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

/// Counters from the rendering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    /// Blocks closed, including one closed by end of input.
    pub blocks: usize,
    /// Entry lines rendered.
    pub entries: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct ticket ids found.
    pub tickets: usize,
    /// Ticket ids resolved to a summary.
    pub resolved: usize,
    pub blocks: usize,
    pub entries: usize,
}

/// Drives both passes for one configured changelog.
pub struct Pipeline<L: IssueLookup + ?Sized> {
    changelog: ChangelogConfig,
    extractor: TicketExtractor,
    categorizer: Categorizer,
    renderer: Renderer,
    resolver: IssueResolver<L>,
}

impl<L: IssueLookup + ?Sized> Pipeline<L> {
    /// Build a pipeline from configuration and an issue lookup service.
    pub fn new(config: &Config, lookup: Arc<L>) -> Result<Self, PipelineError> {
        let project_key = &config.jira.project_key;
        let extractor = TicketExtractor::new(project_key)?;
        let categorizer = Categorizer::new(&config.changelog.type_markers)?;
        let reference = ReferencePattern::new(&config.changelog.reference_pattern, project_key)?;
        let renderer = Renderer::new(config.jira.host.clone(), reference, categorizer.clone());

        Ok(Self {
            changelog: config.changelog.clone(),
            extractor,
            categorizer,
            renderer,
            resolver: IssueResolver::new(lookup),
        })
    }

    fn scanner(&self) -> BlockScanner {
        BlockScanner::new(self.changelog.block_marker.clone())
    }

    /// Pass 1: collect distinct ticket ids from every block entry.
    pub async fn collect_tickets<R>(&self, reader: R) -> io::Result<TicketSet>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut scanner = self.scanner();
        let mut tickets = TicketSet::new();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let step = scanner.advance(&line);
            if step.classify(&line) == LineKind::Entry {
                tickets.extend(self.extractor.extract(&line));
            }
        }

        debug!(tickets = tickets.len(), "Collected ticket ids");
        Ok(tickets)
    }

    /// Resolve collected ids against the issue lookup service.
    pub async fn resolve(&self, tickets: &TicketSet) -> IssueMap {
        self.resolver.resolve(tickets).await
    }

    /// Pass 2: copy the document to `writer`, rendering each block.
    pub async fn generate<R, W>(
        &self,
        reader: R,
        writer: &mut W,
        issues: &IssueMap,
    ) -> Result<GenerateStats, StreamError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut scanner = self.scanner();
        let mut block = Block::default();
        let mut stats = GenerateStats::default();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await.map_err(StreamError::Read)? {
            let step = scanner.advance(&line);
            if step.block_closed {
                self.flush_block(writer, std::mem::take(&mut block), issues, &mut stats)
                    .await?;
            }

            match step.classify(&line) {
                LineKind::Entry => block.push(self.entry(line)),
                LineKind::PassThrough => {
                    writer
                        .write_all(line.as_bytes())
                        .await
                        .map_err(StreamError::Write)?;
                    writer.write_all(b"\n").await.map_err(StreamError::Write)?;
                }
                LineKind::Delimiter => {}
            }
        }

        // End of input closes a block that never saw its blank line
        if scanner.finish() {
            self.flush_block(writer, std::mem::take(&mut block), issues, &mut stats)
                .await?;
        }

        writer.flush().await.map_err(StreamError::Write)?;
        Ok(stats)
    }

    fn entry(&self, line: String) -> Entry {
        Entry {
            ticket_ids: self.extractor.extract(&line),
            category: self.categorizer.categorize(&line),
            raw_line: line,
        }
    }

    async fn flush_block<W>(
        &self,
        writer: &mut W,
        block: Block,
        issues: &IssueMap,
        stats: &mut GenerateStats,
    ) -> Result<(), StreamError>
    where
        W: AsyncWrite + Unpin,
    {
        let rendered = self.renderer.render(&block, issues);
        writer
            .write_all(rendered.as_bytes())
            .await
            .map_err(StreamError::Write)?;

        for category in Category::ALL {
            let count = block.entries(category).len();
            if count > 0 {
                ENTRIES_RENDERED
                    .with_label_values(&[category.as_str()])
                    .inc_by(count as u64);
            }
        }
        BLOCKS_RENDERED.inc();

        stats.blocks += 1;
        stats.entries += block.len();
        debug!(block = stats.blocks, entries = block.len(), "Block rendered");
        Ok(())
    }

    /// Run both passes over the configured input and output files.
    ///
    /// Any prior output is removed first; the new output is appended line by
    /// line as the input is scanned. An output path naming the input file,
    /// under any spelling, is rejected before anything is removed.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let input = &self.changelog.input;
        let output = &self.changelog.output;

        let reader = open_input(input).await?;
        ensure_distinct(input, output).await?;
        clear_output(output).await?;

        info!("Scanning {:?} for ticket ids", input);
        let tickets = self
            .collect_tickets(reader)
            .await
            .map_err(|e| PipelineError::input(input, e))?;

        let issues = self.resolve(&tickets).await;

        info!("Writing {:?}", output);
        let reader = open_input(input).await?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output)
            .await
            .map_err(|e| PipelineError::output(output, e))?;
        let mut writer = BufWriter::new(file);

        let stats = self
            .generate(reader, &mut writer, &issues)
            .await
            .map_err(|e| match e {
                StreamError::Read(e) => PipelineError::input(input, e),
                StreamError::Write(e) => PipelineError::output(output, e),
            })?;

        let summary = RunSummary {
            tickets: tickets.len(),
            resolved: issues.len(),
            blocks: stats.blocks,
            entries: stats.entries,
        };
        info!(
            tickets = summary.tickets,
            resolved = summary.resolved,
            blocks = summary.blocks,
            entries = summary.entries,
            "Changelog generated"
        );
        Ok(summary)
    }
}

async fn open_input(path: &Path) -> Result<BufReader<File>, PipelineError> {
    let file = File::open(path)
        .await
        .map_err(|e| PipelineError::input(path, e))?;
    Ok(BufReader::new(file))
}

async fn ensure_distinct(input: &Path, output: &Path) -> Result<(), PipelineError> {
    // A missing output cannot be the (already opened) input
    if !tokio::fs::try_exists(output)
        .await
        .map_err(|e| PipelineError::output(output, e))?
    {
        return Ok(());
    }

    let input_real = tokio::fs::canonicalize(input)
        .await
        .map_err(|e| PipelineError::input(input, e))?;
    let output_real = tokio::fs::canonicalize(output)
        .await
        .map_err(|e| PipelineError::output(output, e))?;

    if input_real == output_real {
        return Err(PipelineError::OutputIsInput {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
    }
    Ok(())
}

async fn clear_output(path: &Path) -> Result<(), PipelineError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed previous output {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::output(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockIssueLookup};
    use crate::ticket::TicketId;
    use tokio_test::io::Builder;

    fn pipeline(lookup: MockIssueLookup) -> Pipeline<MockIssueLookup> {
        Pipeline::new(&fixtures::config("PROJ"), Arc::new(lookup)).unwrap()
    }

    async fn generate(
        pipeline: &Pipeline<MockIssueLookup>,
        input: &str,
        issues: &IssueMap,
    ) -> String {
        let mut out: Vec<u8> = Vec::new();
        pipeline
            .generate(input.as_bytes(), &mut out, issues)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_collect_tickets_dedups_across_blocks() {
        let p = pipeline(MockIssueLookup::new());
        let tickets = p
            .collect_tickets(fixtures::changelog().as_bytes())
            .await
            .unwrap();

        let ids: Vec<&str> = tickets.iter().map(TicketId::as_str).collect();
        assert_eq!(ids, vec!["PROJ-12", "PROJ-3"]);
    }

    #[tokio::test]
    async fn test_collect_tickets_ignores_lines_outside_blocks() {
        let p = pipeline(MockIssueLookup::new());
        let input = "Mentions PROJ-1\n### Pull Requests\nPROJ-2 before separator\n\n- fix: PROJ-3\n\nPROJ-4\n";
        let tickets = p.collect_tickets(input.as_bytes()).await.unwrap();

        let ids: Vec<&str> = tickets.iter().map(TicketId::as_str).collect();
        assert_eq!(ids, vec!["PROJ-3"]);
    }

    #[tokio::test]
    async fn test_generate_without_marker_is_verbatim() {
        let p = pipeline(MockIssueLookup::new());
        let input = "# Changelog\n\n- feat: PROJ-1 outside\n\ntrailer\n";
        assert_eq!(generate(&p, input, &IssueMap::new()).await, input);
    }

    #[tokio::test]
    async fn test_generate_normalizes_crlf() {
        let p = pipeline(MockIssueLookup::new());
        let out = generate(&p, "a\r\nb\r\n", &IssueMap::new()).await;
        assert_eq!(out, "a\nb\n");
    }

    #[tokio::test]
    async fn test_generate_replaces_block() {
        let p = pipeline(MockIssueLookup::new());
        let issues: IssueMap = [
            (TicketId::from("PROJ-12"), "Single sign-on"),
            (TicketId::from("PROJ-3"), "Remove v1 API"),
        ]
        .into_iter()
        .collect();

        let out = generate(&p, fixtures::changelog(), &issues).await;
        let expected = "# Changelog\n\
\n\
## v1.1.0\n\
\n\
**Changed features:**\n\
- login: add SSO ()\n\
\u{20} - [PROJ-12](https://jira.example.com/browse/PROJ-12) Single sign-on\n\
\n\
\n\
**Fixed:**\n\
- fix: null deref ()\n\
\u{20} - [PROJ-12](https://jira.example.com/browse/PROJ-12) Single sign-on\n\
\n\
\n\
**Others:**\n\
- chore: bump deps\n\
\n\
\n\
## v1.0.0\n\
\n\
**Breaking Changes:**\n\
- api: drop v1 endpoints ()\n\
\u{20} - [PROJ-3](https://jira.example.com/browse/PROJ-3) Remove v1 API\n\
\n\
\n\
Generated by the changelog bot.\n";
        assert_eq!(out, expected);
    }

    #[tokio::test]
    async fn test_generate_flushes_block_at_end_of_input() {
        let p = pipeline(MockIssueLookup::new());
        let mut out: Vec<u8> = Vec::new();
        let stats = p
            .generate(
                "### Pull Requests\n\n- feat: tail (#PROJ-5)".as_bytes(),
                &mut out,
                &IssueMap::new(),
            )
            .await
            .unwrap();

        assert_eq!(stats, GenerateStats { blocks: 1, entries: 1 });
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\n**Changed features:**\n- feat: tail ()\n  - [PROJ-5](https://jira.example.com/browse/PROJ-5)\n\n"
        );
    }

    #[tokio::test]
    async fn test_generate_empty_block() {
        let p = pipeline(MockIssueLookup::new());
        let out = generate(&p, "### Pull Requests\n\n\nafter\n", &IssueMap::new()).await;
        assert_eq!(out, "\nafter\n");
    }

    #[tokio::test]
    async fn test_blocks_do_not_share_entries() {
        let p = pipeline(MockIssueLookup::new());
        let input = "### Pull Requests\n\n- fix: one\n\n### Pull Requests\n\n- feat: two\n\n";
        let out = generate(&p, input, &IssueMap::new()).await;
        assert_eq!(
            out,
            "\n**Fixed:**\n- fix: one\n\n\n\n**Changed features:**\n- feat: two\n\n\n"
        );
    }

    #[tokio::test]
    async fn test_generate_reports_read_failure() {
        let p = pipeline(MockIssueLookup::new());
        let reader = BufReader::new(
            Builder::new()
                .read(b"# Changelog\n")
                .read_error(io::Error::other("disk gone"))
                .build(),
        );
        let mut out: Vec<u8> = Vec::new();

        let err = p
            .generate(reader, &mut out, &IssueMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StreamError::Read(_)));
        assert_eq!(out, b"# Changelog\n");
    }

    #[tokio::test]
    async fn test_generate_reports_write_failure() {
        let p = pipeline(MockIssueLookup::new());
        let mut writer = Builder::new()
            .write_error(io::Error::other("disk full"))
            .build();

        let err = p
            .generate("# Changelog\n".as_bytes(), &mut writer, &IssueMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StreamError::Write(_)));
    }

    #[tokio::test]
    async fn test_invalid_reference_pattern_fails_construction() {
        let mut config = fixtures::config("PROJ");
        config.changelog.reference_pattern = "no placeholder".to_string();
        let result = Pipeline::new(&config, Arc::new(MockIssueLookup::new()));
        assert!(matches!(result, Err(PipelineError::Pattern(_))));
    }
}
