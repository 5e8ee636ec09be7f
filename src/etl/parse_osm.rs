use std::collections::VecDeque;
use std::fs;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;
use std::str;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use xz::bufread::XzDecoder;

use crate::config::UserConfig;
use crate::data::osm::{project, OsmEvent, OsmId};
use crate::data::{BBox, Point};
use crate::errors::{Error, Result};
use crate::map::Map;

use super::pipeline::IngestionPipeline;
use super::Etl;

const ETL_NAME: &str = "parse_osm";
const PROGRESS_STEP_MIB: usize = 64;

struct PendingWay {
    id: OsmId,
    events: Vec<OsmEvent>,
    node_refs: usize,
}

enum ParserState {
    Top,
    Node,
    Way,
    Relation,
}

/// Pulls [`OsmEvent`]s out of an OSM XML document one element at a time.
///
/// Tags are only forwarded inside `<way>`; node and relation tags are skipped, as are relations.
/// A way is held back until its closing tag so that ways without any `<nd>` can be dropped.
pub struct OsmEventReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    state: ParserState,
    pending: VecDeque<OsmEvent>,
    way: Option<PendingWay>,
    reported_mib: usize,
    done: bool,
}

impl<R: BufRead> OsmEventReader<R> {
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        OsmEventReader {
            reader,
            buf: Vec::new(),
            state: ParserState::Top,
            pending: VecDeque::new(),
            way: None,
            reported_mib: 0,
            done: false,
        }
    }

    fn parse_id(el: &BytesStart, key: &[u8]) -> Result<OsmId> {
        Ok(Self::attribute(el, key)?.parse()?)
    }

    fn attribute(el: &BytesStart, key: &[u8]) -> Result<String> {
        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            if attribute.key.as_ref() == key {
                return Ok(attribute.unescape_value()?.into_owned());
            }
        }
        Err(format!(
            "<{}> is missing attribute {}",
            String::from_utf8_lossy(el.name().as_ref()),
            String::from_utf8_lossy(key),
        )
        .into())
    }

    fn parse_node(el: &BytesStart) -> Result<(OsmId, Point)> {
        let mut id: Option<OsmId> = None;
        let mut lat: Option<f64> = None;
        let mut lon: Option<f64> = None;

        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            match attribute.key.as_ref() {
                b"id" => id = Some(str::from_utf8(&attribute.value)?.parse()?),
                b"lat" => lat = Some(str::from_utf8(&attribute.value)?.parse()?),
                b"lon" => lon = Some(str::from_utf8(&attribute.value)?.parse()?),
                _ => (),
            }
        }

        match (id, lat, lon) {
            (Some(id), Some(lat), Some(lon)) => Ok((id, project(lon, lat))),
            _ => Err("<node> needs id, lat and lon".into()),
        }
    }

    /// Projects all four corners; the projection shears, so the corners alone do not order.
    fn parse_bounds(el: &BytesStart) -> Result<BBox> {
        let coord = |key: &[u8]| -> Result<f64> { Ok(Self::attribute(el, key)?.parse()?) };
        let (min_lat, min_lon) = (coord(b"minlat")?, coord(b"minlon")?);
        let (max_lat, max_lon) = (coord(b"maxlat")?, coord(b"maxlon")?);
        Ok(BBox::from_points(&[
            project(min_lon, min_lat),
            project(max_lon, min_lat),
            project(min_lon, max_lat),
            project(max_lon, max_lat),
        ]))
    }

    fn enter(&mut self, el: &BytesStart, is_empty: bool) -> Result<()> {
        let in_way = matches!(self.state, ParserState::Way);
        match (el.name().as_ref(), in_way) {
            (b"bounds", _) => {
                let bbox = Self::parse_bounds(el)?;
                self.pending.push_back(OsmEvent::DeclareExtent {
                    min: bbox.min,
                    max: bbox.max,
                });
            }
            (b"node", _) => {
                let (id, coord) = Self::parse_node(el)?;
                self.pending.push_back(OsmEvent::DeclarePoint { id, coord });
                if !is_empty {
                    self.state = ParserState::Node;
                }
            }
            (b"way", _) => {
                let id = Self::parse_id(el, b"id")?;
                if is_empty {
                    warn!(way_id = id; "Skipping way without nodes");
                } else {
                    self.way = Some(PendingWay {
                        id,
                        events: vec![OsmEvent::BeginFeature { id }],
                        node_refs: 0,
                    });
                    self.state = ParserState::Way;
                }
            }
            (b"relation", _) => {
                if !is_empty {
                    self.state = ParserState::Relation;
                }
            }
            (b"nd", true) => {
                let id = Self::parse_id(el, b"ref")?;
                if let Some(way) = &mut self.way {
                    way.events.push(OsmEvent::PointRef { id });
                    way.node_refs += 1;
                }
            }
            (b"tag", true) => {
                let key = Self::attribute(el, b"k")?;
                let value = Self::attribute(el, b"v")?;
                if let Some(way) = &mut self.way {
                    way.events.push(OsmEvent::Tag { key, value });
                }
            }
            _ => (),
        }
        Ok(())
    }

    fn leave(&mut self, name: &[u8]) {
        match name {
            b"way" => {
                match self.way.take() {
                    Some(way) if way.node_refs == 0 => {
                        warn!(way_id = way.id; "Skipping way without nodes");
                    }
                    Some(way) => {
                        self.pending.extend(way.events);
                        self.pending.push_back(OsmEvent::EndFeature);
                    }
                    None => (),
                }
                self.state = ParserState::Top;
            }
            b"node" | b"relation" => self.state = ParserState::Top,
            _ => (),
        }
    }

    /// Reads one XML event. Returns `false` at end of input.
    fn read_next(&mut self) -> Result<bool> {
        let mut buf = mem::take(&mut self.buf);
        match self.reader.read_event_into(&mut buf)? {
            Event::Eof => return Ok(false),
            Event::Start(e) => self.enter(&e, false)?,
            Event::Empty(e) => self.enter(&e, true)?,
            Event::End(e) => self.leave(e.name().as_ref()),
            Event::Text(_) => return Err("Didn't expect to see Text in OSM file.".into()),
            _ => (),
        }
        // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
        buf.clear();
        self.buf = buf;

        let mib = self.reader.buffer_position() >> 20;
        if mib >= self.reported_mib + PROGRESS_STEP_MIB {
            self.reported_mib = mib;
            debug!(mib = mib; "Parsing OSM input");
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for OsmEventReader<R> {
    type Item = Result<OsmEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }
            match self.read_next() {
                Ok(true) => (),
                Ok(false) => self.done = true,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Loads the configured OSM file into a [`Map`].
pub struct ParseOsmEtl<'a> {
    config: &'a UserConfig,
}

impl ParseOsmEtl<'_> {
    pub fn new(config: &UserConfig) -> ParseOsmEtl<'_> {
        ParseOsmEtl { config }
    }

    fn create_osm_reader(&self) -> Result<OsmEventReader<Box<dyn BufRead>>> {
        let path = Path::new(&self.config.data_path);
        let file_reader = BufReader::new(fs::File::open(path)?);
        let input: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "xz") {
            Box::new(BufReader::new(XzDecoder::new(file_reader)))
        } else {
            Box::new(file_reader)
        };
        Ok(OsmEventReader::new(input))
    }

    fn create_pipeline(&self) -> Result<IngestionPipeline> {
        let pipeline = IngestionPipeline::new(self.config.max_depth);
        Ok(match &self.config.require_tag {
            Some(pattern) => {
                let re = Regex::new(pattern)?;
                pipeline.with_filter(move |tags| tags.keys().any(|key| re.is_match(key)))
            }
            None => pipeline,
        })
    }
}

impl Etl for ParseOsmEtl<'_> {
    type Input = OsmEventReader<Box<dyn BufRead>>;
    type Output = Map;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn extract(&mut self) -> Result<Self::Input> {
        self.create_osm_reader()
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let mut pipeline = self.create_pipeline()?;
        for event in input {
            pipeline.handle(event?)?;
        }
        pipeline.finish().map_err(Error::from)
    }
}
