//! Streaming extraction of mean rates from the NBP average-rate table.
//!
//! The document is a flat sequence of `pozycja` entries under a single root:
//!
//! ```xml
//! <tabela_kursow typ="A">
//!   <pozycja>
//!     <nazwa_waluty>dolar amerykański</nazwa_waluty>
//!     <przelicznik>1</przelicznik>
//!     <kod_waluty>USD</kod_waluty>
//!     <kurs_sredni>3,3880</kurs_sredni>
//!   </pozycja>
//! </tabela_kursow>
//! ```
//!
//! Only the code and mean-rate fields are ever decoded, so the declared
//! single-byte encoding of the published files is irrelevant to the scan.

use crate::core::currency::{CurrencyCode, RateTable};
use crate::core::error::ParseError;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use rust_decimal::Decimal;
use std::io::BufRead;
use std::str::FromStr;
use tracing::{debug, instrument};

const ENTRY_TAG: &[u8] = b"pozycja";
const CODE_TAG: &[u8] = b"kod_waluty";
const RATE_TAG: &[u8] = b"kurs_sredni";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Idle,
    Code,
    Rate,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Self {
        if tag.eq_ignore_ascii_case(CODE_TAG) {
            Field::Code
        } else if tag.eq_ignore_ascii_case(RATE_TAG) {
            Field::Rate
        } else {
            Field::Idle
        }
    }
}

/// Per-call scan state. Lives on the stack of one `parse` call.
struct Scan<'a> {
    requested: [&'a CurrencyCode; 2],
    local_currency: &'a CurrencyCode,
    field: Field,
    text: String,
    pending: [bool; 2],
    depth: usize,
    seen_root: bool,
    table: RateTable,
}

impl<'a> Scan<'a> {
    fn start_element(&mut self, tag: &[u8]) {
        self.depth += 1;
        self.seen_root = true;
        self.field = Field::from_tag(tag);
        self.text.clear();
    }

    fn end_element(&mut self, tag: &[u8]) -> Result<(), ParseError> {
        self.depth = self.depth.saturating_sub(1);
        match Field::from_tag(tag) {
            Field::Code => self.code_read(),
            Field::Rate => self.rate_read()?,
            Field::Idle if tag.eq_ignore_ascii_case(ENTRY_TAG) => self.pending = [false; 2],
            Field::Idle => {}
        }
        self.field = Field::Idle;
        self.text.clear();
        Ok(())
    }

    fn code_read(&mut self) {
        for (pending, code) in self.pending.iter_mut().zip(self.requested) {
            // The local currency is fixed at 1.0 and never taken from the document
            if code != self.local_currency && code.matches(&self.text) {
                *pending = true;
            }
        }
    }

    fn rate_read(&mut self) -> Result<(), ParseError> {
        for (pending, code) in self.pending.iter().zip(self.requested) {
            if *pending {
                let rate = parse_rate(code, &self.text)?;
                debug!(%code, %rate, "Matched rate table entry");
                self.table.insert(code.clone(), rate);
            }
        }
        Ok(())
    }

    fn collecting(&self) -> bool {
        self.field != Field::Idle
    }
}

/// Parses a mean rate written with a comma decimal separator.
fn parse_rate(code: &CurrencyCode, text: &str) -> Result<Decimal, ParseError> {
    let invalid = || ParseError::InvalidRate {
        code: code.to_string(),
        text: text.trim().to_string(),
    };
    let rate = Decimal::from_str(&text.trim().replace(',', ".")).map_err(|_| invalid())?;
    if rate <= Decimal::ZERO {
        return Err(invalid());
    }
    Ok(rate)
}

pub struct RateTableParser {
    local_currency: CurrencyCode,
}

impl RateTableParser {
    pub fn new(local_currency: CurrencyCode) -> Self {
        RateTableParser { local_currency }
    }

    pub fn local_currency(&self) -> &CurrencyCode {
        &self.local_currency
    }

    /// Scans the document once and returns the rates of `code1` and `code2`.
    ///
    /// Codes missing from the document are absent from the result. If either
    /// code is the local currency it is seeded with a rate of 1.0.
    #[instrument(name = "RateTableParse", skip(self, input))]
    pub fn parse<R: BufRead>(
        &self,
        input: R,
        code1: &CurrencyCode,
        code2: &CurrencyCode,
    ) -> Result<RateTable, ParseError> {
        let mut scan = Scan {
            requested: [code1, code2],
            local_currency: &self.local_currency,
            field: Field::Idle,
            text: String::new(),
            pending: [false; 2],
            depth: 0,
            seen_root: false,
            table: RateTable::new(),
        };

        if code1 == &self.local_currency || code2 == &self.local_currency {
            scan.table.insert(self.local_currency.clone(), Decimal::ONE);
        }

        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Err(e) => return Err(ParseError::Xml(e.to_string())),
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => scan.start_element(e.local_name().as_ref()),
                Ok(Event::End(e)) => scan.end_element(e.local_name().as_ref())?,
                Ok(Event::Empty(_)) => scan.seen_root = true,
                Ok(Event::Text(t)) if scan.collecting() => {
                    let text = t.unescape().map_err(|e| ParseError::Xml(e.to_string()))?;
                    scan.text.push_str(&text);
                }
                Ok(Event::CData(c)) if scan.collecting() => {
                    let text =
                        std::str::from_utf8(&c).map_err(|e| ParseError::Xml(e.to_string()))?;
                    scan.text.push_str(text);
                }
                Ok(_) => {}
            }
            buf.clear();
        }

        if !scan.seen_root {
            return Err(ParseError::NoRootElement);
        }
        if scan.depth > 0 {
            return Err(ParseError::Truncated);
        }

        debug!(found = scan.table.len(), "Finished scanning rate table");
        Ok(scan.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tabela_kursow typ="A" uid="18a019">
    <numer_tabeli>019/A/NBP/2018</numer_tabeli>
    <data_publikacji>2018-01-26</data_publikacji>
    <pozycja>
        <nazwa_waluty>dolar amerykański</nazwa_waluty>
        <przelicznik>1</przelicznik>
        <kod_waluty>USD</kod_waluty>
        <kurs_sredni>3,3565</kurs_sredni>
    </pozycja>
    <pozycja>
        <nazwa_waluty>euro</nazwa_waluty>
        <przelicznik>1</przelicznik>
        <kod_waluty>EUR</kod_waluty>
        <kurs_sredni>4,1488</kurs_sredni>
    </pozycja>
    <pozycja>
        <nazwa_waluty>frank szwajcarski</nazwa_waluty>
        <przelicznik>1</przelicznik>
        <kod_waluty>CHF</kod_waluty>
        <kurs_sredni>3,5697</kurs_sredni>
    </pozycja>
</tabela_kursow>"#;

    fn parser() -> RateTableParser {
        RateTableParser::new(CurrencyCode::new("PLN"))
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_extracts_requested_rates_only() {
        let table = parser()
            .parse(TABLE.as_bytes(), &code("USD"), &code("chf"))
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rate(&code("USD")), Some(dec("3.3565")));
        assert_eq!(table.rate(&code("CHF")), Some(dec("3.5697")));
        assert!(!table.contains(&code("EUR")));
    }

    #[test]
    fn test_comma_separator_is_normalized() {
        let doc = "<t><pozycja><kod_waluty>GBP</kod_waluty><kurs_sredni>3,9000</kurs_sredni></pozycja></t>";
        let table = parser().parse(doc.as_bytes(), &code("GBP"), &code("GBP")).unwrap();
        assert_eq!(table.rate(&code("GBP")), Some(dec("3.9")));
    }

    #[test]
    fn test_missing_code_is_absent() {
        let table = parser()
            .parse(TABLE.as_bytes(), &code("USD"), &code("XAU"))
            .unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.contains(&code("XAU")));
    }

    #[test]
    fn test_same_code_twice_yields_single_entry() {
        let table = parser()
            .parse(TABLE.as_bytes(), &code("eur"), &code("EUR"))
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate(&code("EUR")), Some(dec("4.1488")));
    }

    #[test]
    fn test_local_currency_is_seeded_and_not_overridden() {
        let doc = r#"<t>
            <pozycja><kod_waluty>PLN</kod_waluty><kurs_sredni>2,0000</kurs_sredni></pozycja>
            <pozycja><kod_waluty>USD</kod_waluty><kurs_sredni>4,2000</kurs_sredni></pozycja>
        </t>"#;
        let table = parser().parse(doc.as_bytes(), &code("USD"), &code("pln")).unwrap();
        assert_eq!(table.rate(&code("PLN")), Some(Decimal::ONE));
        assert_eq!(table.rate(&code("USD")), Some(dec("4.2")));

        let only_local = parser()
            .parse(TABLE.as_bytes(), &code("PLN"), &code("PLN"))
            .unwrap();
        assert_eq!(only_local.len(), 1);
        assert_eq!(only_local.rate(&code("PLN")), Some(Decimal::ONE));
    }

    #[test]
    fn test_match_does_not_leak_into_next_entry() {
        // First entry has a code but no rate; its match must not claim the next entry's rate.
        let doc = r#"<t>
            <pozycja><kod_waluty>USD</kod_waluty></pozycja>
            <pozycja><kod_waluty>EUR</kod_waluty><kurs_sredni>4,1488</kurs_sredni></pozycja>
        </t>"#;
        let table = parser().parse(doc.as_bytes(), &code("USD"), &code("JPY")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_tag_names_are_case_insensitive() {
        let doc = "<T><POZYCJA><Kod_Waluty>usd</Kod_Waluty><KURS_SREDNI>3,3565</KURS_SREDNI></POZYCJA></T>";
        let table = parser().parse(doc.as_bytes(), &code("USD"), &code("USD")).unwrap();
        assert_eq!(table.rate(&code("USD")), Some(dec("3.3565")));
    }

    #[test]
    fn test_undecoded_fields_may_use_single_byte_encoding() {
        // "dolar amerykański" in ISO-8859-2, which is not valid UTF-8
        let doc: &[u8] = b"<?xml version=\"1.0\" encoding=\"ISO-8859-2\"?>\
            <tabela_kursow><pozycja><nazwa_waluty>dolar ameryka\xF1ski</nazwa_waluty>\
            <kod_waluty>USD</kod_waluty><kurs_sredni>3,3565</kurs_sredni></pozycja></tabela_kursow>";
        let table = parser().parse(doc, &code("USD"), &code("USD")).unwrap();
        assert_eq!(table.rate(&code("USD")), Some(dec("3.3565")));
    }

    #[test]
    fn test_invalid_rate_is_parse_error() {
        let doc = "<t><pozycja><kod_waluty>USD</kod_waluty><kurs_sredni>n/a</kurs_sredni></pozycja></t>";
        let err = parser()
            .parse(doc.as_bytes(), &code("USD"), &code("EUR"))
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidRate {
                code: "USD".to_string(),
                text: "n/a".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_rate_of_unrequested_entry_is_ignored() {
        let doc = r#"<t>
            <pozycja><kod_waluty>XXX</kod_waluty><kurs_sredni>??</kurs_sredni></pozycja>
            <pozycja><kod_waluty>USD</kod_waluty><kurs_sredni>3,3565</kurs_sredni></pozycja>
        </t>"#;
        let table = parser().parse(doc.as_bytes(), &code("USD"), &code("USD")).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_non_positive_rate_is_rejected() {
        let doc = "<t><pozycja><kod_waluty>USD</kod_waluty><kurs_sredni>0,0000</kurs_sredni></pozycja></t>";
        let err = parser()
            .parse(doc.as_bytes(), &code("USD"), &code("USD"))
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidRate { .. }));
    }

    #[test]
    fn test_malformed_documents() {
        let truncated = "<t><pozycja><kod_waluty>USD</kod_waluty>";
        let err = parser()
            .parse(truncated.as_bytes(), &code("USD"), &code("EUR"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Truncated | ParseError::Xml(_)));

        let mismatched = "<t><pozycja><kod_waluty>USD</kurs_sredni></pozycja></t>";
        let err = parser()
            .parse(mismatched.as_bytes(), &code("USD"), &code("EUR"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));

        let err = parser()
            .parse("not a rate table".as_bytes(), &code("USD"), &code("EUR"))
            .unwrap_err();
        assert_eq!(err, ParseError::NoRootElement);
    }

    #[test]
    fn test_parsing_is_repeatable() {
        let p = parser();
        let first = p.parse(TABLE.as_bytes(), &code("USD"), &code("EUR")).unwrap();
        let second = p.parse(TABLE.as_bytes(), &code("USD"), &code("EUR")).unwrap();
        assert_eq!(first, second);
    }
}
