//! # bizdoc-xml — XML Codec
//!
//! Bidirectional conversion between the bizdoc model and XML text.
//!
//! ```text
//! <idoc:Document xmlns:idoc="{base}/idoc" xmlns:T="{base}/idoc/R/T/E/S/A" ...header...>
//!   <rootSegment document="/">
//!     <segmentChildren parent="//@rootSegment">
//!       <T:LEVEL1 parent="//@rootSegment" document="/" CHAR_FIELD="..."/>
//!     </segmentChildren>
//!   </rootSegment>
//! </idoc:Document>
//! ```
//!
//! Document lists wrap `<document>` elements in `<idoc:DocumentList>`.
//! Function parameters are `<rfc:Request>` or `<rfc:Response>` with scalar
//! members as attributes, nested structures and tables as child elements,
//! and table rows as `<row>`.
//!
//! ## Failure Policy
//!
//! Decoding is all-or-nothing. Malformed XML, unknown element or attribute
//! names, and field values that fail coercion all yield an error from the
//! `decode_*` functions and `None` from the `to_*` functions.
//!
//! ## Round Trip
//!
//! Decoding an encoded model reproduces its header, shape, hierarchy levels
//! and every field value. The creation stamp is taken afresh on decode.

pub mod codec;
mod dom;
pub mod error;
pub mod options;
mod read;
pub mod write;

pub use codec::{XmlCodec, XmlSource};
pub use error::CodecError;
pub use options::{CodecOptions, DEFAULT_NAMESPACE_BASE, IDOC_PREFIX, RFC_PREFIX};
pub use write::XmlModel;
