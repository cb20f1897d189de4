//! Streaming document decoder.
//!
//! [`Decoder`] is a single-pass state machine over [`Token`]s. It holds a
//! depth counter and at most one pending record introduction, and turns each
//! token into at most one [`ConstructionEvent`]:
//!
//! | token | state | result |
//! |---|---|---|
//! | `{` | introduction pending | depth + 1, `Create(id)` |
//! | `{` | first token | root opened |
//! | `{` | otherwise | object skipped |
//! | `}` | - | depth - 1, done at 0 |
//! | field name | starts with ID indicator | introduction pending |
//! | `null` | - | skipped, pending introduction dropped |
//! | scalar | introduction pending | malformed, see [`IntroductionPolicy`] |
//! | scalar | - | `Instruction`, `Link` or `Attribute` by [`FieldKind`] |
//!
//! Link targets are passed through untouched; resolving them is the
//! collaborator's job.

use std::io::Read;

use tracing::{debug, trace, warn};

use crate::codec::tokenizer::{JsonReader, Scalar, Token, TokenSource};
use crate::config::{DecodeOptions, Indicators, IntroductionPolicy};
use crate::error::DecodeError;
use crate::model::{Construct, ConstructionEvent};

/// Role of a JSON field under the record/link/instruction convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Name is an identifier; the value is the record's object.
    Introduction,
    /// Name starts with the instruction indicator.
    Instruction,
    /// Value is an identifier.
    Link,
    /// Anything else.
    Attribute,
}

impl FieldKind {
    /// Classifies a field from its name alone, which is all that is known
    /// when the field name token arrives. Only introductions are decided here.
    pub fn of_name(name: &str, indicators: &Indicators) -> Option<FieldKind> {
        indicators
            .is_identifier(name)
            .then_some(FieldKind::Introduction)
    }

    /// Classifies a field with a scalar value.
    ///
    /// The instruction check on the name wins over the link check on the
    /// value, so instruction text may itself look like an identifier.
    pub fn of_value(name: &str, value: &str, indicators: &Indicators) -> FieldKind {
        if indicators.is_instruction(name) {
            FieldKind::Instruction
        } else if indicators.is_identifier(value) {
            FieldKind::Link
        } else {
            FieldKind::Attribute
        }
    }
}

/// What the caller must do after feeding one token to [`Decoder::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing to do; read the next token.
    Continue,
    /// Hand the event to the collaborator.
    Emit(ConstructionEvent),
    /// Skip the children of the token just read (no-op for scalars).
    Skip,
    /// The root object closed; stop reading.
    Done,
}

/// Counters describing one decode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub records: usize,
    pub attributes: usize,
    pub links: usize,
    pub instructions: usize,
    /// Values skipped: nulls, arrays, unmarked objects, malformed introductions.
    pub skipped: usize,
    /// True if the root object was closed.
    pub complete: bool,
}

/// The decode state machine.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    indicators: &'a Indicators,
    policy: IntroductionPolicy,
    // Starts at 1: the root object counts as already open.
    depth: usize,
    root_opened: bool,
    pending: Option<String>,
    stats: DecodeStats,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder in its initial state.
    pub fn new(options: &'a DecodeOptions) -> Self {
        Self {
            indicators: &options.indicators,
            policy: options.introductions,
            depth: 1,
            root_opened: false,
            pending: None,
            stats: DecodeStats::default(),
        }
    }

    /// Current depth: 1 at the root level, 2 inside a record.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Identifier of the introduction waiting for its object, if any.
    pub fn pending_introduction(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Advances the state machine by one token.
    ///
    /// `current_name` is the tokenizer's name for the field the token belongs
    /// to; it is only consulted for scalars.
    pub fn step(&mut self, token: Token, current_name: Option<&str>) -> Result<Step, DecodeError> {
        if self.stats.complete {
            return Ok(Step::Done);
        }
        match token {
            Token::StartObject => Ok(self.start_object()),
            Token::EndObject => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    self.stats.complete = true;
                    Ok(Step::Done)
                } else {
                    Ok(Step::Continue)
                }
            }
            Token::StartArray => {
                self.require_root()?;
                if self.pending.is_some() {
                    return self.malformed_introduction();
                }
                self.stats.skipped += 1;
                Ok(Step::Skip)
            }
            // Arrays are always skipped whole, so their end is never seen here
            // unless the token source does not honour `skip_children`.
            Token::EndArray => Ok(Step::Continue),
            Token::FieldName(name) => {
                if FieldKind::of_name(&name, self.indicators).is_some() {
                    self.pending = Some(name);
                }
                Ok(Step::Continue)
            }
            Token::Scalar(Scalar::Null) => {
                self.require_root()?;
                // An identifier with a null value introduces nothing.
                self.pending = None;
                self.stats.skipped += 1;
                Ok(Step::Skip)
            }
            Token::Scalar(scalar) => {
                self.require_root()?;
                if self.pending.is_some() {
                    return self.malformed_introduction();
                }
                Ok(self.scalar(scalar, current_name.unwrap_or_default()))
            }
        }
    }

    /// Finishes the run and returns its counters.
    pub fn finish(self) -> DecodeStats {
        self.stats
    }

    fn start_object(&mut self) -> Step {
        if let Some(id) = self.pending.take() {
            self.depth += 1;
            self.stats.records += 1;
            trace!(%id, depth = self.depth, "record introduced");
            Step::Emit(ConstructionEvent::Create { id })
        } else if !self.root_opened {
            self.root_opened = true;
            Step::Continue
        } else {
            self.stats.skipped += 1;
            Step::Skip
        }
    }

    fn scalar(&mut self, scalar: Scalar, name: &str) -> Step {
        let Some(value) = scalar.as_text() else {
            self.stats.skipped += 1;
            return Step::Skip;
        };
        let event = match FieldKind::of_value(name, &value, self.indicators) {
            FieldKind::Instruction => {
                self.stats.instructions += 1;
                ConstructionEvent::Instruction {
                    text: value.into_owned(),
                }
            }
            FieldKind::Link => {
                self.stats.links += 1;
                ConstructionEvent::Link {
                    name: name.to_string(),
                    target: value.into_owned(),
                }
            }
            FieldKind::Attribute | FieldKind::Introduction => {
                self.stats.attributes += 1;
                ConstructionEvent::Attribute {
                    name: name.to_string(),
                    value: value.into_owned(),
                }
            }
        };
        Step::Emit(event)
    }

    fn require_root(&self) -> Result<(), DecodeError> {
        if self.root_opened {
            Ok(())
        } else {
            Err(DecodeError::RootNotObject)
        }
    }

    fn malformed_introduction(&mut self) -> Result<Step, DecodeError> {
        let id = self.pending.take().unwrap_or_default();
        match self.policy {
            IntroductionPolicy::Reject => Err(DecodeError::MalformedIntroduction { id }),
            IntroductionPolicy::Skip => {
                warn!(%id, "record introduction without an object, skipped");
                self.stats.skipped += 1;
                Ok(Step::Skip)
            }
        }
    }
}

/// Drives `constructor` with the events of one document read from `source`.
///
/// Reading stops as soon as the root object closes; anything after it is
/// left unread. On error the collaborator keeps whatever it received so far.
pub fn decode<S, C>(
    source: &mut S,
    constructor: &mut C,
    options: &DecodeOptions,
) -> Result<DecodeStats, DecodeError>
where
    S: TokenSource + ?Sized,
    C: Construct + ?Sized,
{
    let mut decoder = Decoder::new(options);
    while let Some(token) = source.next_token()? {
        match decoder.step(token, source.current_name())? {
            Step::Continue => {}
            Step::Emit(event) => constructor.apply(event),
            Step::Skip => source.skip_children()?,
            Step::Done => break,
        }
    }
    let stats = decoder.finish();
    debug!(
        records = stats.records,
        attributes = stats.attributes,
        links = stats.links,
        instructions = stats.instructions,
        skipped = stats.skipped,
        complete = stats.complete,
        "document decoded"
    );
    Ok(stats)
}

/// [`decode`] over an in-memory document.
pub fn decode_slice<C>(
    input: &[u8],
    constructor: &mut C,
    options: &DecodeOptions,
) -> Result<DecodeStats, DecodeError>
where
    C: Construct + ?Sized,
{
    decode(&mut JsonReader::from_slice(input), constructor, options)
}

/// [`decode`] over any byte stream.
pub fn decode_reader<R, C>(
    reader: R,
    constructor: &mut C,
    options: &DecodeOptions,
) -> Result<DecodeStats, DecodeError>
where
    R: Read,
    C: Construct + ?Sized,
{
    decode(&mut JsonReader::from_reader(reader), constructor, options)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::model::EventLog;

    fn create(id: &str) -> ConstructionEvent {
        ConstructionEvent::Create { id: id.to_string() }
    }

    fn attribute(name: &str, value: &str) -> ConstructionEvent {
        ConstructionEvent::Attribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn link(name: &str, target: &str) -> ConstructionEvent {
        ConstructionEvent::Link {
            name: name.to_string(),
            target: target.to_string(),
        }
    }

    fn instruction(text: &str) -> ConstructionEvent {
        ConstructionEvent::Instruction {
            text: text.to_string(),
        }
    }

    fn events(input: &str) -> Result<Vec<ConstructionEvent>, DecodeError> {
        let mut log = EventLog::new();
        decode_slice(input.as_bytes(), &mut log, &DecodeOptions::default())?;
        Ok(log.into_events())
    }

    /// Token source replaying a fixed sequence, without skip support.
    struct Replay {
        tokens: VecDeque<(Token, Option<&'static str>)>,
        name: Option<&'static str>,
    }

    impl TokenSource for Replay {
        fn next_token(&mut self) -> Result<Option<Token>, DecodeError> {
            Ok(self.tokens.pop_front().map(|(token, name)| {
                self.name = name;
                token
            }))
        }

        fn current_name(&self) -> Option<&str> {
            self.name
        }

        fn skip_children(&mut self) -> Result<(), DecodeError> {
            Ok(())
        }
    }

    #[test]
    fn test_step_transitions() {
        let options = DecodeOptions::default();
        let mut decoder = Decoder::new(&options);
        assert_eq!(decoder.depth(), 1);

        assert_eq!(decoder.step(Token::StartObject, None), Ok(Step::Continue));
        assert_eq!(
            decoder.step(Token::FieldName("%ID:0".into()), Some("%ID:0")),
            Ok(Step::Continue)
        );
        assert_eq!(decoder.pending_introduction(), Some("%ID:0"));
        assert_eq!(
            decoder.step(Token::StartObject, Some("%ID:0")),
            Ok(Step::Emit(create("%ID:0")))
        );
        assert_eq!(decoder.depth(), 2);
        assert_eq!(decoder.pending_introduction(), None);

        assert_eq!(
            decoder.step(Token::FieldName("name".into()), Some("name")),
            Ok(Step::Continue)
        );
        assert_eq!(
            decoder.step(Token::Scalar(Scalar::String("A".into())), Some("name")),
            Ok(Step::Emit(attribute("name", "A")))
        );
        assert_eq!(decoder.step(Token::EndObject, Some("%ID:0")), Ok(Step::Continue));
        assert_eq!(decoder.depth(), 1);
        assert_eq!(decoder.step(Token::EndObject, None), Ok(Step::Done));

        let stats = decoder.finish();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.attributes, 1);
        assert!(stats.complete);
    }

    #[test]
    fn test_field_kind() {
        let indicators = Indicators::default();
        assert_eq!(
            FieldKind::of_name("%ID:4", &indicators),
            Some(FieldKind::Introduction)
        );
        assert_eq!(FieldKind::of_name("name", &indicators), None);
        assert_eq!(
            FieldKind::of_value("%CHECK:0", "%ID:1", &indicators),
            FieldKind::Instruction
        );
        assert_eq!(FieldKind::of_value("prev", "%ID:1", &indicators), FieldKind::Link);
        assert_eq!(FieldKind::of_value("name", "A", &indicators), FieldKind::Attribute);
    }

    #[test]
    fn test_chain_of_three() {
        let got = events(concat!(
            r#"{"%ID:0":{"name":"A"},"#,
            r#""%ID:1":{"name":"B","prev":"%ID:0"},"#,
            r#""%ID:2":{"name":"C","prev":"%ID:1"}}"#
        ))
        .unwrap();
        assert_eq!(
            got,
            vec![
                create("%ID:0"),
                attribute("name", "A"),
                create("%ID:1"),
                attribute("name", "B"),
                link("prev", "%ID:0"),
                create("%ID:2"),
                attribute("name", "C"),
                link("prev", "%ID:1"),
            ]
        );
    }

    #[test]
    fn test_instructions_keep_their_place() {
        let got = events(concat!(
            r#"{"%CHECK:0":"start-group","#,
            r#""%ID:0":{"name":"A"},"#,
            r#""%ID:1":{"name":"B","prev":"%ID:0"},"#,
            r#""%CHECK:1":"end-group"}"#
        ))
        .unwrap();
        assert_eq!(
            got,
            vec![
                instruction("start-group"),
                create("%ID:0"),
                attribute("name", "A"),
                create("%ID:1"),
                attribute("name", "B"),
                link("prev", "%ID:0"),
                instruction("end-group"),
            ]
        );
    }

    #[test]
    fn test_instruction_inside_record_belongs_to_document() {
        let got = events(r#"{"%ID:0":{"%CHECK:7":"mid","a":"b"}}"#).unwrap();
        assert_eq!(
            got,
            vec![create("%ID:0"), instruction("mid"), attribute("a", "b")]
        );
    }

    #[test]
    fn test_null_values_are_skipped() {
        let got = events(r#"{"%ID:0":{"a":null,"b":"x"},"c":null,"%ID:1":{"d":"y"}}"#).unwrap();
        assert_eq!(
            got,
            vec![
                create("%ID:0"),
                attribute("b", "x"),
                create("%ID:1"),
                attribute("d", "y"),
            ]
        );
    }

    #[test]
    fn test_null_introduction_is_dropped() {
        for policy in [IntroductionPolicy::Reject, IntroductionPolicy::Skip] {
            let options = DecodeOptions::new().with_introductions(policy);
            let mut log = EventLog::new();
            let stats = decode_slice(
                br#"{"%ID:0":null,"x":"y","%ID:1":{"a":"b"}}"#,
                &mut log,
                &options,
            )
            .unwrap();
            assert_eq!(
                log.into_events(),
                vec![attribute("x", "y"), create("%ID:1"), attribute("a", "b")]
            );
            assert_eq!(stats.records, 1);
            assert_eq!(stats.skipped, 1);
        }
    }

    #[test]
    fn test_forward_and_dangling_links_pass_through() {
        let got = events(r#"{"%ID:0":{"next":"%ID:1","lost":"%ID:404"},"%ID:1":{}}"#).unwrap();
        assert_eq!(
            got,
            vec![
                create("%ID:0"),
                link("next", "%ID:1"),
                link("lost", "%ID:404"),
                create("%ID:1"),
            ]
        );
    }

    #[test]
    fn test_stops_at_root_end() {
        let mut log = EventLog::new();
        let stats = decode_slice(
            br#"{"%ID:0":{},"%ID:1":{}} {"%ID:2":{}}"#,
            &mut log,
            &DecodeOptions::default(),
        )
        .unwrap();
        assert_eq!(log.created().collect::<Vec<_>>(), vec!["%ID:0", "%ID:1"]);
        assert_eq!(stats.records, 2);
        assert!(stats.complete);
    }

    #[test]
    fn test_trailing_tokens_stay_unread() {
        let mut source = Replay {
            tokens: VecDeque::from(vec![
                (Token::StartObject, None),
                (Token::FieldName("%ID:0".into()), Some("%ID:0")),
                (Token::StartObject, Some("%ID:0")),
                (Token::EndObject, Some("%ID:0")),
                (Token::EndObject, None),
                (Token::FieldName("%ID:1".into()), Some("%ID:1")),
                (Token::StartObject, Some("%ID:1")),
            ]),
            name: None,
        };
        let mut log = EventLog::new();
        let stats = decode(&mut source, &mut log, &DecodeOptions::default()).unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(source.tokens.len(), 2);
    }

    #[test]
    fn test_unmarked_objects_and_arrays_are_skipped() {
        let got = events(
            r#"{"meta":{"x":"1","%ID:9":{}},"%ID:0":{"tags":["a","b"],"pos":{"x":"1"},"n":42,"ok":false}}"#,
        )
        .unwrap();
        assert_eq!(
            got,
            vec![create("%ID:0"), attribute("n", "42"), attribute("ok", "false")]
        );
    }

    #[test]
    fn test_nested_introduction_creates_record() {
        let mut log = EventLog::new();
        let stats = decode_slice(
            br#"{"%ID:0":{"a":"1","%ID:1":{"b":"2"},"c":"3"}}"#,
            &mut log,
            &DecodeOptions::default(),
        )
        .unwrap();
        assert_eq!(
            log.into_events(),
            vec![
                create("%ID:0"),
                attribute("a", "1"),
                create("%ID:1"),
                attribute("b", "2"),
                attribute("c", "3"),
            ]
        );
        assert!(stats.complete);
    }

    #[test]
    fn test_malformed_introduction_rejected() {
        assert_eq!(
            events(r#"{"%ID:0":"oops","%ID:1":{}}"#),
            Err(DecodeError::MalformedIntroduction {
                id: "%ID:0".to_string()
            })
        );
        assert_eq!(
            events(r#"{"%ID:0":["oops"]}"#),
            Err(DecodeError::MalformedIntroduction {
                id: "%ID:0".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_introduction_skipped() {
        let options = DecodeOptions::new().with_introductions(IntroductionPolicy::Skip);
        let mut log = EventLog::new();
        let stats = decode_slice(
            br#"{"%ID:0":"oops","x":"y","%ID:1":["z"],"%ID:2":{"a":"b"}}"#,
            &mut log,
            &options,
        )
        .unwrap();
        assert_eq!(
            log.into_events(),
            vec![attribute("x", "y"), create("%ID:2"), attribute("a", "b")]
        );
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn test_root_must_be_object() {
        assert_eq!(events(r#"["a"]"#), Err(DecodeError::RootNotObject));
        assert_eq!(events(r#""a""#), Err(DecodeError::RootNotObject));
    }

    #[test]
    fn test_empty_input() {
        let mut log = EventLog::new();
        for input in [&b""[..], b"  \n"] {
            let stats = decode_slice(input, &mut log, &DecodeOptions::default()).unwrap();
            assert_eq!(stats, DecodeStats::default());
        }
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_parse_error_keeps_partial_events() {
        let mut log = EventLog::new();
        let result = decode_slice(
            br#"{"%ID:0":{"name":"A"},"%ID:1":{"name":"B" "oops"}}"#,
            &mut log,
            &DecodeOptions::default(),
        );
        assert!(matches!(result, Err(DecodeError::UnexpectedByte { .. })));
        assert_eq!(
            log.into_events(),
            vec![
                create("%ID:0"),
                attribute("name", "A"),
                create("%ID:1"),
                attribute("name", "B"),
            ]
        );
    }

    #[test]
    fn test_truncated_document_fails() {
        let mut log = EventLog::new();
        let result = decode_slice(br#"{"%ID:0":{"name":"A"}"#, &mut log, &DecodeOptions::default());
        assert_eq!(
            result,
            Err(DecodeError::UnexpectedEof {
                context: "document"
            })
        );
        assert_eq!(log.created().count(), 1);
    }

    #[test]
    fn test_custom_indicators() {
        let options = DecodeOptions::new().with_indicators(Indicators::new("@", "!").unwrap());
        let mut log = EventLog::new();
        decode_reader(
            &br#"{"!0":"go","@a":{"name":"A","%ID:0":"plain"},"@b":{"prev":"@a"}}"#[..],
            &mut log,
            &options,
        )
        .unwrap();
        assert_eq!(
            log.into_events(),
            vec![
                instruction("go"),
                create("@a"),
                attribute("name", "A"),
                attribute("%ID:0", "plain"),
                create("@b"),
                link("prev", "@a"),
            ]
        );
    }
}
