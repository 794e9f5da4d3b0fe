//! In-memory corpus snapshot indexed by `(chapter_id, verse_id)`.
//!
//! [`CorpusStore`] is built once from the bulk XML resource and is immutable
//! afterwards; every lookup is a pure read.  Normalised verse text is computed
//! at load time so the locator never re-normalises corpus text.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use super::normalize::normalize;
use super::CorpusError;

/// Number of chapters in the canonical corpus.
pub const CHAPTER_COUNT: u16 = 114;

// ---------------------------------------------------------------------------
// Verse / Chapter
// ---------------------------------------------------------------------------

/// A single addressable verse.
#[derive(Debug, Clone, Serialize)]
pub struct Verse {
    pub id: u16,
    /// Canonical text exactly as stored in the corpus (trimmed).
    pub text: String,
    /// [`normalize`]d form of `text`.
    #[serde(skip)]
    pub normalized: String,
}

impl Verse {
    /// An empty verse body is treated as absent when scanning a chapter.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// A chapter with its verses ordered by id.
#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub id: u16,
    pub name: String,
    pub verses: BTreeMap<u16, Verse>,
}

/// `{id, name}` pair returned by [`CorpusStore::list_chapters`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterSummary {
    pub id: u16,
    pub name: String,
}

// ---------------------------------------------------------------------------
// CorpusStore
// ---------------------------------------------------------------------------

/// Immutable snapshot of the canonical text collection.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    chapters: BTreeMap<u16, Chapter>,
}

impl CorpusStore {
    /// Read and parse the XML corpus at `path`.
    pub fn load_from(path: &Path) -> Result<Self, CorpusError> {
        let xml = std::fs::read_to_string(path)?;
        Self::from_xml(&xml)
    }

    /// Parse the bulk XML document.
    ///
    /// Expected shape:
    ///
    /// ```text
    /// <Quran>
    ///   <Chapter ChapterID="1" ChapterName="Al-Fatihah">
    ///     <Verse VerseID="1">…</Verse>
    ///   </Chapter>
    /// </Quran>
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self, CorpusError> {
        let xml = xml.strip_prefix('\u{FEFF}').unwrap_or(xml);

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut chapters: BTreeMap<u16, Chapter> = BTreeMap::new();
        let mut current: Option<Chapter> = None;
        let mut open_verse: Option<(u16, String)> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                CorpusError::Parse(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ))
            })?;

            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"Chapter" => {
                        if let Some(open) = &current {
                            return Err(CorpusError::Parse(format!(
                                "nested Chapter inside Chapter {}",
                                open.id
                            )));
                        }
                        current = Some(parse_chapter_start(&e)?);
                    }
                    b"Verse" => open_verse = Some((parse_verse_id(&e)?, String::new())),
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"Chapter" => {
                        insert_chapter(&mut chapters, parse_chapter_start(&e)?)?;
                    }
                    b"Verse" => {
                        let id = parse_verse_id(&e)?;
                        push_verse(current.as_mut(), id, String::new())?;
                    }
                    _ => {}
                },
                Event::Text(t) => {
                    if let Some((_, body)) = open_verse.as_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| CorpusError::Parse(e.to_string()))?;
                        body.push_str(&text);
                    }
                }
                Event::CData(c) => {
                    if let Some((_, body)) = open_verse.as_mut() {
                        body.push_str(&String::from_utf8_lossy(&c));
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"Verse" => {
                        if let Some((id, body)) = open_verse.take() {
                            push_verse(current.as_mut(), id, body)?;
                        }
                    }
                    b"Chapter" => {
                        if let Some(chapter) = current.take() {
                            insert_chapter(&mut chapters, chapter)?;
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if chapters.is_empty() {
            return Err(CorpusError::Empty);
        }

        Ok(Self { chapters })
    }

    /// Canonical text of a verse, or `None` when it does not exist.
    pub fn get_item(&self, chapter_id: u16, verse_id: u16) -> Option<&str> {
        self.verse(chapter_id, verse_id).map(|v| v.text.as_str())
    }

    /// Full verse record, including its normalised text.
    pub fn verse(&self, chapter_id: u16, verse_id: u16) -> Option<&Verse> {
        self.chapters.get(&chapter_id)?.verses.get(&verse_id)
    }

    /// All chapters as `{id, name}` in ascending id order.
    pub fn list_chapters(&self) -> Vec<ChapterSummary> {
        self.chapters
            .values()
            .map(|c| ChapterSummary {
                id: c.id,
                name: c.name.clone(),
            })
            .collect()
    }

    /// A chapter with its ordered verses, or `None` for an unknown id.
    pub fn get_chapter(&self, chapter_id: u16) -> Option<&Chapter> {
        self.chapters.get(&chapter_id)
    }

    /// Iterate chapters in ascending id order.
    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.values()
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn verse_count(&self) -> usize {
        self.chapters.values().map(|c| c.verses.len()).sum()
    }

    /// Normalised substring search across every verse.
    ///
    /// Returns `(chapter_id, verse_id)` pairs in corpus order.  An empty
    /// (post-normalisation) query matches nothing.
    pub fn search_verses(&self, query: &str) -> Vec<(u16, u16)> {
        let needle = normalize(query);
        if needle.is_empty() {
            return Vec::new();
        }

        self.chapters
            .values()
            .flat_map(|c| c.verses.values().map(move |v| (c.id, v)))
            .filter(|(_, v)| v.normalized.contains(&needle))
            .map(|(cid, v)| (cid, v.id))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// XML helpers
// ---------------------------------------------------------------------------

fn parse_chapter_start(e: &BytesStart<'_>) -> Result<Chapter, CorpusError> {
    let id = required_id(e, "ChapterID")?;
    if !(1..=CHAPTER_COUNT).contains(&id) {
        return Err(CorpusError::Parse(format!(
            "ChapterID {id} outside 1..={CHAPTER_COUNT}"
        )));
    }
    let name = attribute(e, "ChapterName")?.unwrap_or_default();
    Ok(Chapter {
        id,
        name,
        verses: BTreeMap::new(),
    })
}

fn parse_verse_id(e: &BytesStart<'_>) -> Result<u16, CorpusError> {
    let id = required_id(e, "VerseID")?;
    if id == 0 {
        return Err(CorpusError::Parse("VerseID must be at least 1".into()));
    }
    Ok(id)
}

fn insert_chapter(
    chapters: &mut BTreeMap<u16, Chapter>,
    chapter: Chapter,
) -> Result<(), CorpusError> {
    if chapters.contains_key(&chapter.id) {
        return Err(CorpusError::Parse(format!("duplicate ChapterID {}", chapter.id)));
    }
    chapters.insert(chapter.id, chapter);
    Ok(())
}

fn push_verse(chapter: Option<&mut Chapter>, id: u16, body: String) -> Result<(), CorpusError> {
    let chapter = chapter
        .ok_or_else(|| CorpusError::Parse(format!("Verse {id} outside of a Chapter")))?;
    if chapter.verses.contains_key(&id) {
        return Err(CorpusError::Parse(format!(
            "duplicate VerseID {id} in Chapter {}",
            chapter.id
        )));
    }
    let text = body.trim().to_string();
    let normalized = normalize(&text);
    chapter.verses.insert(
        id,
        Verse {
            id,
            text,
            normalized,
        },
    );
    Ok(())
}

fn required_id(e: &BytesStart<'_>, name: &str) -> Result<u16, CorpusError> {
    let raw = attribute(e, name)?
        .ok_or_else(|| CorpusError::Parse(format!("missing {name} attribute")))?;
    raw.trim()
        .parse()
        .map_err(|_| CorpusError::Parse(format!("invalid {name} {raw:?}")))
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, CorpusError> {
    let Some(attr) = e
        .try_get_attribute(name)
        .map_err(|err| CorpusError::Parse(err.to_string()))?
    else {
        return Ok(None);
    };
    let value = attr
        .unescape_value()
        .map_err(|err| CorpusError::Parse(err.to_string()))?;
    Ok(Some(value.into_owned()))
}

// ---------------------------------------------------------------------------
// Test fixture
// ---------------------------------------------------------------------------

/// Small corpus used across the crate's tests: Al-Fatihah (7 verses),
/// the first verses of Al-Baqarah, Al-Ikhlas and An-Nas.
#[cfg(test)]
pub(crate) const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Quran>
  <Chapter ChapterID="1" ChapterName="Al-Fatihah">
    <Verse VerseID="1">بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ</Verse>
    <Verse VerseID="2">الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ</Verse>
    <Verse VerseID="3">الرَّحْمَٰنِ الرَّحِيمِ</Verse>
    <Verse VerseID="4">مَالِكِ يَوْمِ الدِّينِ</Verse>
    <Verse VerseID="5">إِيَّاكَ نَعْبُدُ وَإِيَّاكَ نَسْتَعِينُ</Verse>
    <Verse VerseID="6">اهْدِنَا الصِّرَاطَ الْمُسْتَقِيمَ</Verse>
    <Verse VerseID="7">صِرَاطَ الَّذِينَ أَنْعَمْتَ عَلَيْهِمْ غَيْرِ الْمَغْضُوبِ عَلَيْهِمْ وَلَا الضَّالِّينَ</Verse>
  </Chapter>
  <Chapter ChapterID="2" ChapterName="Al-Baqarah">
    <Verse VerseID="1">الم</Verse>
    <Verse VerseID="2">ذَٰلِكَ الْكِتَابُ لَا رَيْبَ ۛ فِيهِ ۛ هُدًى لِّلْمُتَّقِينَ</Verse>
    <Verse VerseID="3">الَّذِينَ يُؤْمِنُونَ بِالْغَيْبِ وَيُقِيمُونَ الصَّلَاةَ وَمِمَّا رَزَقْنَاهُمْ يُنفِقُونَ</Verse>
  </Chapter>
  <Chapter ChapterID="112" ChapterName="Al-Ikhlas">
    <Verse VerseID="1">قُلْ هُوَ اللَّهُ أَحَدٌ</Verse>
    <Verse VerseID="2">اللَّهُ الصَّمَدُ</Verse>
    <Verse VerseID="3">لَمْ يَلِدْ وَلَمْ يُولَدْ</Verse>
    <Verse VerseID="4">وَلَمْ يَكُن لَّهُ كُفُوًا أَحَدٌ</Verse>
  </Chapter>
  <Chapter ChapterID="114" ChapterName="An-Nas">
    <Verse VerseID="1">قُلْ أَعُوذُ بِرَبِّ النَّاسِ</Verse>
    <Verse VerseID="2">مَلِكِ النَّاسِ</Verse>
    <Verse VerseID="3">إِلَٰهِ النَّاسِ</Verse>
    <Verse VerseID="4">مِن شَرِّ الْوَسْوَاسِ الْخَنَّاسِ</Verse>
    <Verse VerseID="5">الَّذِي يُوَسْوِسُ فِي صُدُورِ النَّاسِ</Verse>
    <Verse VerseID="6">مِنَ الْجِنَّةِ وَالنَّاسِ</Verse>
  </Chapter>
</Quran>
"#;

#[cfg(test)]
pub(crate) fn sample_store() -> CorpusStore {
    CorpusStore::from_xml(SAMPLE_XML).expect("sample corpus parses")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_sample_counts() {
        let store = sample_store();
        assert_eq!(store.chapter_count(), 4);
        assert_eq!(store.verse_count(), 7 + 3 + 4 + 6);
    }

    #[test]
    fn get_item_returns_raw_text() {
        let store = sample_store();
        assert_eq!(store.get_item(112, 2), Some("اللَّهُ الصَّمَدُ"));
        assert_eq!(store.verse(112, 2).unwrap().normalized, "الله الصمد");
    }

    #[test]
    fn get_item_absent() {
        let store = sample_store();
        assert_eq!(store.get_item(1, 8), None);
        assert_eq!(store.get_item(3, 1), None);
        assert_eq!(store.get_item(1, 0), None);
    }

    #[test]
    fn list_chapters_is_ordered() {
        let store = sample_store();
        let ids: Vec<u16> = store.list_chapters().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 112, 114]);
        assert_eq!(store.list_chapters()[0].name, "Al-Fatihah");
    }

    #[test]
    fn get_chapter_has_ordered_verses() {
        let store = sample_store();
        let chapter = store.get_chapter(114).expect("An-Nas");
        assert_eq!(chapter.name, "An-Nas");
        let ids: Vec<u16> = chapter.verses.keys().copied().collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert!(store.get_chapter(50).is_none());
    }

    #[test]
    fn strips_bom() {
        let with_bom = format!("\u{FEFF}{SAMPLE_XML}");
        let store = CorpusStore::from_xml(&with_bom).expect("parses");
        assert_eq!(store.chapter_count(), 4);
    }

    #[test]
    fn empty_document_is_an_error() {
        let err = CorpusStore::from_xml("<Quran></Quran>").unwrap_err();
        assert!(matches!(err, CorpusError::Empty));
    }

    #[test]
    fn malformed_xml_is_parse_error() {
        let err = CorpusStore::from_xml("<Quran><Chapter ChapterID=\"1\"><Verse VerseID=\"1\">x</Chapter>")
            .unwrap_err();
        assert!(matches!(err, CorpusError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn missing_chapter_id_is_parse_error() {
        let err = CorpusStore::from_xml("<Quran><Chapter ChapterName=\"x\"></Chapter></Quran>")
            .unwrap_err();
        assert!(err.to_string().contains("ChapterID"));
    }

    #[test]
    fn out_of_range_chapter_is_parse_error() {
        let err = CorpusStore::from_xml("<Quran><Chapter ChapterID=\"115\"></Chapter></Quran>")
            .unwrap_err();
        assert!(matches!(err, CorpusError::Parse(_)));
    }

    #[test]
    fn non_numeric_verse_id_is_parse_error() {
        let xml = "<Quran><Chapter ChapterID=\"1\"><Verse VerseID=\"one\">x</Verse></Chapter></Quran>";
        assert!(matches!(
            CorpusStore::from_xml(xml).unwrap_err(),
            CorpusError::Parse(_)
        ));
    }

    #[test]
    fn nested_chapter_is_parse_error() {
        let xml = r#"<Quran><Chapter ChapterID="1" ChapterName="A"><Verse VerseID="1">a</Verse>
            <Chapter ChapterID="2" ChapterName="B"><Verse VerseID="1">b</Verse></Chapter>
        </Chapter></Quran>"#;
        let err = CorpusStore::from_xml(xml).unwrap_err();
        assert!(err.to_string().contains("nested Chapter"), "got {err}");
    }

    #[test]
    fn duplicate_chapter_id_is_parse_error() {
        let xml = r#"<Quran>
            <Chapter ChapterID="1" ChapterName="A"><Verse VerseID="1">a</Verse></Chapter>
            <Chapter ChapterID="1" ChapterName="B"><Verse VerseID="1">b</Verse></Chapter>
        </Quran>"#;
        let err = CorpusStore::from_xml(xml).unwrap_err();
        assert!(err.to_string().contains("duplicate ChapterID 1"), "got {err}");
    }

    #[test]
    fn duplicate_verse_id_is_parse_error() {
        let xml = r#"<Quran><Chapter ChapterID="1" ChapterName="A">
            <Verse VerseID="1">a</Verse><Verse VerseID="1">b</Verse>
        </Chapter></Quran>"#;
        let err = CorpusStore::from_xml(xml).unwrap_err();
        assert!(matches!(err, CorpusError::Parse(_)));
        assert!(err.to_string().contains("duplicate VerseID 1"), "got {err}");
    }

    #[test]
    fn empty_verse_is_kept_but_blank() {
        let xml = "<Quran><Chapter ChapterID=\"1\" ChapterName=\"A\"><Verse VerseID=\"1\">a</Verse><Verse VerseID=\"2\"/></Chapter></Quran>";
        let store = CorpusStore::from_xml(xml).expect("parses");
        assert!(store.verse(1, 2).unwrap().is_blank());
        assert_eq!(store.get_item(1, 2), Some(""));
    }

    #[test]
    fn escaped_entities_are_unescaped() {
        let xml = "<Quran><Chapter ChapterID=\"1\" ChapterName=\"A &amp; B\"><Verse VerseID=\"1\">x &lt; y</Verse></Chapter></Quran>";
        let store = CorpusStore::from_xml(xml).expect("parses");
        assert_eq!(store.get_chapter(1).unwrap().name, "A & B");
        assert_eq!(store.get_item(1, 1), Some("x < y"));
    }

    #[test]
    fn search_finds_normalized_substring() {
        let store = sample_store();
        // Unmarked query matches marked text.
        let hits = store.search_verses("الرحمن الرحيم");
        assert_eq!(hits, vec![(1, 1), (1, 3)]);
    }

    #[test]
    fn search_empty_query_returns_nothing() {
        let store = sample_store();
        assert!(store.search_verses("  ").is_empty());
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempdir().expect("temp dir");
        let err = CorpusStore::load_from(&dir.path().join("nope.xml")).unwrap_err();
        assert!(matches!(err, CorpusError::Io(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("quran.xml");
        std::fs::write(&path, SAMPLE_XML).expect("write");
        let store = CorpusStore::load_from(&path).expect("load");
        assert_eq!(store.get_item(1, 4), Some("مَالِكِ يَوْمِ الدِّينِ"));
    }
}
