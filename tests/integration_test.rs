use gridflow::anonymizer;
use gridflow::channel::{ChannelPublisher, PanelMessage};
use gridflow::detector::{count_table_elements, DetectorSession};
use gridflow::dom::{GridNode, HtmlNode, HtmlPage};
use gridflow::{Classifier, Extractor, GridflowConfig};

const PAGE: &str = r#"
<html><body>
  <h1>Quarterly report</h1>
  <table id="sales" data-width="600" data-height="200">
    <thead><tr><th>Region</th><th>Q1</th><th>Q2</th></tr></thead>
    <tbody>
      <tr><td>North</td><td>10</td><td>12</td></tr>
      <tr><td>South</td><td id="cell">7&#8203;</td><td>9</td></tr>
      <tr><td>West</td><td>4</td><td>
        5
      </td></tr>
    </tbody>
  </table>

  <div id="cards" class="cards" data-width="800" data-height="300">
    <div class="card"><span>Name</span><span>Email</span></div>
    <div class="card"><span id="ada">Ada</span><span>ada@example.com</span></div>
    <div class="card"><span>Alan</span><span>alan@example.org</span></div>
    <div class="card"><span>Grace</span><span>415-555-0100</span></div>
  </div>

  <ul id="badges" data-width="18" data-height="18">
    <li>a</li><li>b</li><li>c</li><li>d</li>
  </ul>

  <p id="prose">Nothing tabular here.</p>
</body></html>
"#;

type Session<'a> = DetectorSession<HtmlNode<'a>, ChannelPublisher>;

#[test]
fn test_native_table_end_to_end() {
    let page = HtmlPage::parse(PAGE);
    let (publisher, mut panel) = ChannelPublisher::pair();
    let mut session: Session = DetectorSession::new(&GridflowConfig::default(), publisher);
    session.start(Some(&page.root()));
    assert_eq!(panel.try_recv().unwrap(), PanelMessage::TableCount { count: 1 });

    let cell = page.select_first("#cell").unwrap();
    let selection = session.on_pointer_move(&cell).unwrap();
    assert_eq!(selection.target.tag_name(), "table");
    assert_eq!(selection.rect.width, 600.0);

    let table = session.on_click().unwrap();
    assert_eq!(table.headers, vec!["Region", "Q1", "Q2"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[1], vec!["South", "7", "9"]);
    assert_eq!(table.rows[2], vec!["West", "4", "5"]);

    assert_eq!(panel.try_recv().unwrap(), PanelMessage::ExtractionStarted);
    match panel.try_recv().unwrap() {
        PanelMessage::TableData { headers, data } => {
            assert_eq!(headers.len(), 3);
            assert_eq!(data.len(), 3);
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn test_div_cards_extract_and_mask() {
    let page = HtmlPage::parse(PAGE);
    let (publisher, _panel) = ChannelPublisher::pair();
    let mut session: Session = DetectorSession::new(&GridflowConfig::default(), publisher);
    session.start(None);

    let ada = page.select_first("#ada").unwrap();
    let selection = session.on_pointer_move(&ada).unwrap();
    assert_eq!(selection.target.attr("id"), Some("cards"));

    let table = session.on_click().unwrap();
    assert_eq!(table.headers, vec!["Name", "Email"]);
    assert!(table.is_rectangular());

    let masked = table.anonymized();
    assert_eq!(masked.rows[0], vec!["Ada", "a***@e***.com"]);
    assert_eq!(masked.rows[1], vec!["Alan", "a***@e***.org"]);
    assert_eq!(masked.rows[2], vec!["Grace", anonymizer::PHONE_MASK]);
}

#[test]
fn test_small_region_is_never_highlighted() {
    let page = HtmlPage::parse(PAGE);
    let badges = page.select_first("#badges").unwrap();
    assert!(Classifier::default().qualifies(&badges));

    let (publisher, _panel) = ChannelPublisher::pair();
    let mut session: Session = DetectorSession::new(&GridflowConfig::default(), publisher);
    session.start(None);

    let item = page.select_first("#badges li").unwrap();
    assert!(session.on_pointer_move(&item).is_none());
    assert!(session.selection().is_none());
    assert!(session.on_click().is_none());
}

#[test]
fn test_prose_is_not_a_candidate() {
    let page = HtmlPage::parse(PAGE);
    let prose = page.select_first("#prose").unwrap();
    assert!(!Classifier::default().is_candidate(&prose));

    let (publisher, _panel) = ChannelPublisher::pair();
    let mut session: Session = DetectorSession::new(&GridflowConfig::default(), publisher);
    session.start(None);
    assert!(session.on_pointer_move(&prose).is_none());
}

#[test]
fn test_native_row_counts() {
    let page = HtmlPage::parse(PAGE);
    let sales = page.select_first("#sales").unwrap();
    let rows = Extractor::default().extract_rows(&sales);
    assert_eq!(rows.len(), 4);
    assert_eq!(Extractor::default().extract(&sales).rows.len(), rows.len() - 1);
    assert_eq!(count_table_elements(&page.root()), 1);
}
