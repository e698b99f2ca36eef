use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::anonymizer;
use crate::channel::{JsonLinesPublisher, Publisher};
use crate::config::{GridflowConfig, HeaderPolicy};
use crate::detector::{count_table_elements, scan_candidates, Classifier, DetectorSession};
use crate::dom::{GridNode, HtmlNode, HtmlPage, SnapshotNode, SnapshotTree};
use crate::error::{ErrorContext, GridflowError, GridflowResult};
use crate::export::{self, ExportFormat};
use crate::extractor::{ExtractedTable, Extractor};
use crate::logging::PerformanceTimer;

/// A page loaded from disk: saved markup or a JSON DOM snapshot.
pub enum Document {
    Html(HtmlPage),
    Snapshot(SnapshotTree),
}

impl Document {
    /// `.json` files are snapshots, anything else is parsed as HTML.
    pub async fn load(path: &Path) -> GridflowResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_path(&path.to_string_lossy())?;

        let is_snapshot = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_snapshot {
            Ok(Document::Snapshot(SnapshotTree::from_json(&content)?))
        } else {
            Ok(Document::Html(HtmlPage::parse(&content)))
        }
    }
}

/// Element named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// CSS selector. Snapshots only understand the `#id` form.
    Selector(String),
    NodeId(String),
}

/// Resolve the target in the document, then run `f` on the page root and
/// the target.
fn with_target<'d, T>(
    document: &'d Document,
    target: &Target,
    f: impl FnOnce(Root<'d>) -> T,
) -> GridflowResult<T> {
    match document {
        Document::Html(page) => {
            let node = match target {
                Target::Selector(selector) => page.select_first(selector)?,
                Target::NodeId(id) => page.select_first(&format!("[id=\"{}\"]", id.replace('"', "\\\"")))?,
            };
            Ok(f(Root::Html(page, node)))
        }
        Document::Snapshot(tree) => {
            let id = match target {
                Target::NodeId(id) => id.as_str(),
                Target::Selector(selector) => selector
                    .strip_prefix('#')
                    .filter(|id| !id.is_empty() && !id.contains([' ', '.', '[', '>', ':']))
                    .ok_or_else(|| {
                        GridflowError::configuration(format!(
                            "snapshots are addressed by node id, '{}' is not an #id selector",
                            selector
                        ))
                    })?,
            };
            let node = tree.find_by_id(id)?;
            Ok(f(Root::Snapshot(tree, node)))
        }
    }
}

/// Settle the export format and output path. An explicit format names a
/// bare output path's extension; otherwise the output extension picks the
/// format and CSV is the default.
pub fn resolve_output(
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
) -> GridflowResult<(ExportFormat, Option<PathBuf>)> {
    let extension = output
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_string());

    let format = match (format, &extension) {
        (Some(format), _) => format,
        (None, Some(ext)) => ext.parse::<ExportFormat>()?,
        (None, None) => ExportFormat::Csv,
    };

    let output = output.map(|path| {
        if extension.is_none() {
            path.with_extension(format.extension())
        } else {
            path
        }
    });
    Ok((format, output))
}

enum Root<'d> {
    Html(&'d HtmlPage, HtmlNode<'d>),
    Snapshot(&'d SnapshotTree, SnapshotNode<'d>),
}

/// List the native table count and every region a hover could select.
pub async fn scan_command(input: PathBuf, config: &GridflowConfig) -> GridflowResult<()> {
    info!("Scanning {:?}", input);
    let timer = PerformanceTimer::start("scan");
    let document = Document::load(&input).await?;
    timer.checkpoint("loaded");
    let classifier = Classifier::new(config.detection.clone());

    match &document {
        Document::Html(page) => print_scan(&classifier, &page.root(), &page.body()),
        Document::Snapshot(tree) => print_scan(&classifier, &tree.root(), &tree.root()),
    }
    Ok(())
}

fn print_scan<N: GridNode>(classifier: &Classifier, root: &N, body: &N) {
    println!("Native/ARIA tables: {}", count_table_elements(root));

    let candidates = scan_candidates(classifier, body);
    println!("Candidates: {}", candidates.len());
    for (i, node) in candidates.iter().enumerate() {
        let rect = node.rect();
        let reason = classifier
            .classify(node)
            .map(|r| format!("{:?}", r))
            .unwrap_or_default();
        println!(
            "  {:>3}. <{}> class=\"{}\" children={} rect={}x{} at ({}, {}) [{}]",
            i + 1,
            node.tag_name(),
            node.class_name(),
            node.child_count(),
            rect.width,
            rect.height,
            rect.left,
            rect.top,
            reason
        );
    }
}

/// Drive a detector session: hover the target, optionally click. Panel
/// messages are written to stdout as JSON lines.
pub async fn hover_command(
    input: PathBuf,
    target: Target,
    click: bool,
    anonymize: bool,
    config: &GridflowConfig,
) -> GridflowResult<()> {
    let document = Document::load(&input).await?;
    let publisher = JsonLinesPublisher::new(std::io::stdout());

    let mut config = config.clone();
    config.session.anonymize |= anonymize;

    with_target(&document, &target, |root| match root {
        Root::Html(page, node) => run_gesture(&config, &publisher, &page.root(), &node, click),
        Root::Snapshot(tree, node) => run_gesture(&config, &publisher, &tree.root(), &node, click),
    })?;
    Ok(())
}

fn run_gesture<N: GridNode, P: Publisher>(
    config: &GridflowConfig,
    publisher: P,
    root: &N,
    target: &N,
    click: bool,
) {
    let mut session = DetectorSession::new(config, publisher);
    session.start(Some(root));

    match session.on_pointer_move(target) {
        Some(selection) => eprintln!(
            "Selected <{}> {}x{} at ({}, {})",
            selection.target.tag_name(),
            selection.rect.width,
            selection.rect.height,
            selection.rect.left,
            selection.rect.top
        ),
        None => eprintln!("Nothing to highlight under {}", target.tag_name()),
    }

    if click {
        match session.on_click() {
            Some(table) if table.is_empty() => warn!("Extraction produced no data"),
            Some(table) => eprintln!("Extracted {} rows", table.rows.len()),
            None => eprintln!("Nothing selected, click ignored"),
        }
    }
    session.stop();
}

/// Extract the target directly, without the hover gate.
pub async fn extract_command(
    input: PathBuf,
    target: Target,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    anonymize: bool,
    no_header: bool,
    config: &GridflowConfig,
) -> GridflowResult<()> {
    info!("Extracting {:?} from {:?}", target, input);
    let timer = PerformanceTimer::start("extract");
    let (format, output) = resolve_output(format, output)?;
    let document = Document::load(&input).await?;
    timer.checkpoint("loaded");

    let policy = if no_header {
        HeaderPolicy::None
    } else {
        config.detection.header_policy
    };
    let extractor = Extractor::new(policy);

    let mut table: ExtractedTable = with_target(&document, &target, |root| match root {
        Root::Html(_, node) => extractor.extract(&node),
        Root::Snapshot(_, node) => extractor.extract(&node),
    })?;

    timer.checkpoint("extracted");
    if table.is_empty() {
        warn!("Extraction produced no data");
    }
    if anonymize {
        table = table.anonymized();
    }

    match output {
        Some(path) => export::write_to_file(&table, format, &path)?,
        None => print!("{}", export::render(&table, format)?),
    }
    Ok(())
}

/// Mask the given text, or every stdin line.
pub async fn mask_command(text: Option<String>) -> GridflowResult<()> {
    if let Some(text) = text {
        println!("{}", anonymizer::mask(&text));
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.with_path("<stdin>")? {
        println!("{}", anonymizer::mask(&line));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::PanelMessage;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_picks_format_by_extension() {
        let dir = tempdir().unwrap();
        let html = dir.path().join("page.html");
        let json = dir.path().join("page.JSON");
        std::fs::write(&html, "<table><tr><td>1</td></tr></table>").unwrap();
        std::fs::write(&json, r#"{"tag": "div"}"#).unwrap();

        assert!(matches!(Document::load(&html).await.unwrap(), Document::Html(_)));
        assert!(matches!(Document::load(&json).await.unwrap(), Document::Snapshot(_)));
    }

    #[tokio::test]
    async fn test_extract_command_writes_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("page.html");
        let output = dir.path().join("out.csv");
        std::fs::write(
            &input,
            "<table id=t><tr><th>mail</th></tr><tr><td>ann@site.io</td></tr><tr><td>-</td></tr></table>",
        )
        .unwrap();

        extract_command(
            input,
            Target::Selector("#t".to_string()),
            Some(ExportFormat::Csv),
            Some(output.clone()),
            true,
            false,
            &GridflowConfig::default(),
        )
        .await
        .unwrap();

        let csv = std::fs::read_to_string(output).unwrap();
        assert_eq!(csv, "mail\na***@s***.io\n-\n");
    }

    #[tokio::test]
    async fn test_snapshot_target_by_id() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("snap.json");
        let output = dir.path().join("out.tsv");
        std::fs::write(
            &input,
            r#"{"tag": "UL", "id": "list", "children": [
                {"tag": "LI", "text": "a"}, {"tag": "LI", "text": "b"}
            ]}"#,
        )
        .unwrap();

        extract_command(
            input.clone(),
            Target::NodeId("list".to_string()),
            None,
            Some(output.clone()),
            false,
            true,
            &GridflowConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "a\nb\n");

        let err = extract_command(
            input,
            Target::Selector("ul > li".to_string()),
            None,
            None,
            false,
            false,
            &GridflowConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GridflowError::Configuration { .. }));
    }

    #[test]
    fn test_resolve_output() {
        assert_eq!(resolve_output(None, None).unwrap(), (ExportFormat::Csv, None));

        let (format, path) = resolve_output(None, Some(PathBuf::from("out.MD"))).unwrap();
        assert_eq!(format, ExportFormat::Markdown);
        assert_eq!(path, Some(PathBuf::from("out.MD")));

        let (format, path) = resolve_output(Some(ExportFormat::Json), Some(PathBuf::from("out"))).unwrap();
        assert_eq!(format, ExportFormat::Json);
        assert_eq!(path, Some(PathBuf::from("out.json")));

        assert!(matches!(
            resolve_output(None, Some(PathBuf::from("out.xlsx"))).unwrap_err(),
            GridflowError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn test_html_target_by_node_id() {
        let document = Document::Html(HtmlPage::parse("<ul id=list><li>a</li></ul>"));
        let tag = with_target(&document, &Target::NodeId("list".to_string()), |root| match root {
            Root::Html(_, node) => node.tag_name().to_string(),
            Root::Snapshot(_, node) => node.tag_name().to_string(),
        })
        .unwrap();
        assert_eq!(tag, "ul");
    }

    const GESTURE_PAGE: &str = r#"<html><body>
        <table id="people" data-width="400" data-height="120">
          <tr><th>Name</th><th>Email</th></tr>
          <tr><td id="ada">Ada</td><td>ada@example.com</td></tr>
          <tr><td>Alan</td><td>alan@example.org</td></tr>
        </table>
    </body></html>"#;

    fn gesture_lines(config: &GridflowConfig, click: bool) -> Vec<PanelMessage> {
        let page = HtmlPage::parse(GESTURE_PAGE);
        let target = page.select_first("#ada").unwrap();
        let publisher = JsonLinesPublisher::new(Vec::new());
        run_gesture(config, &publisher, &page.root(), &target, click);

        String::from_utf8(publisher.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_gesture_writes_json_lines() {
        let messages = gesture_lines(&GridflowConfig::default(), true);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], PanelMessage::TableCount { count: 1 });
        assert_eq!(messages[1], PanelMessage::ExtractionStarted);
        match &messages[2] {
            PanelMessage::TableData { headers, data } => {
                assert_eq!(headers, &vec!["Name", "Email"]);
                assert_eq!(data[0], vec!["Ada", "ada@example.com"]);
            }
            other => panic!("unexpected message {:?}", other),
        }

        let hover_only = gesture_lines(&GridflowConfig::default(), false);
        assert_eq!(hover_only, vec![PanelMessage::TableCount { count: 1 }]);
    }

    #[test]
    fn test_gesture_anonymizes_published_table() {
        let mut config = GridflowConfig::default();
        config.session.anonymize = true;
        let messages = gesture_lines(&config, true);
        match &messages[2] {
            PanelMessage::TableData { data, .. } => {
                assert_eq!(data[0], vec!["Ada", "a***@e***.com"]);
                assert_eq!(data[1], vec!["Alan", "a***@e***.org"]);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scan_command() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("page.html");
        std::fs::write(&input, GESTURE_PAGE).unwrap();
        scan_command(input, &GridflowConfig::default()).await.unwrap();

        let missing = dir.path().join("missing.html");
        let err = scan_command(missing, &GridflowConfig::default()).await.unwrap_err();
        assert!(matches!(err, GridflowError::FileIO { .. }));
    }
}
