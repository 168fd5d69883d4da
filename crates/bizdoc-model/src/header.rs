//! # Control Header
//!
//! Every IDoc carries a control record: partner, address, and routing
//! metadata plus serialization and status flags. The XML codec writes each
//! field as a camelCase attribute of the document element; the native-call
//! adapter addresses it by its control-record name.
//!
//! The creation date and time are not header fields. They belong to the
//! document's [`CreationStamp`](bizdoc_core::CreationStamp), which no decoder
//! restores.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Attribute name of the creation date (`YYYYMMDD`).
pub const CREATION_DATE: &str = "creationDate";

/// Attribute name of the creation time (`HHMMSS`).
pub const CREATION_TIME: &str = "creationTime";

/// Control-record name of the creation date.
pub const CREATION_DATE_CONTROL: &str = "CREDAT";

/// Control-record name of the creation time.
pub const CREATION_TIME_CONTROL: &str = "CRETIM";

macro_rules! header_fields {
    ($( $(#[$doc:meta])* $variant:ident => $attribute:literal, $control:literal; )+) => {
        /// One field of the control header.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum HeaderField {
            $( $(#[$doc])* $variant, )+
        }

        impl HeaderField {
            /// All header fields in attribute order.
            pub fn all() -> &'static [HeaderField] {
                &[ $( Self::$variant, )+ ]
            }

            /// The XML attribute name.
            pub fn attribute(&self) -> &'static str {
                match self {
                    $( Self::$variant => $attribute, )+
                }
            }

            /// The control-record field name used by native connectors.
            pub fn control_name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $control, )+
                }
            }

            /// Look up a field by its XML attribute name.
            pub fn from_attribute(name: &str) -> Option<Self> {
                match name {
                    $( $attribute => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

header_fields! {
    /// Archive key for the EDI archive.
    ArchiveKey => "archiveKey", "ARCKEY";
    Client => "client", "MANDT";
    /// `1` for outbound, `2` for inbound.
    Direction => "direction", "DIRECT";
    EdiMessage => "ediMessage", "REFMES";
    EdiMessageGroup => "ediMessageGroup", "REFGRP";
    EdiMessageType => "ediMessageType", "STDMES";
    EdiStandardFlag => "ediStandardFlag", "STD";
    EdiStandardVersion => "ediStandardVersion", "STDVRS";
    EdiTransmissionFile => "ediTransmissionFile", "REFINT";
    IdocCompoundType => "idocCompoundType", "DOCTYP";
    IdocNumber => "idocNumber", "DOCNUM";
    /// Release of the IDoc; seeded from the key's system release.
    IdocSapRelease => "idocSapRelease", "DOCREL";
    /// Basic type; seeded from the key.
    IdocType => "idocType", "IDOCTYP";
    /// Extension type; seeded from the key.
    IdocTypeExtension => "idocTypeExtension", "CIMTYP";
    MessageCode => "messageCode", "MESCOD";
    MessageFunction => "messageFunction", "MESFCT";
    MessageType => "messageType", "MESTYP";
    OutputMode => "outputMode", "OUTMOD";
    RecipientAddress => "recipientAddress", "RCVSAD";
    RecipientLogicalAddress => "recipientLogicalAddress", "RCVLAD";
    RecipientPartnerFunction => "recipientPartnerFunction", "RCVPFC";
    RecipientPartnerNumber => "recipientPartnerNumber", "RCVPRN";
    RecipientPartnerType => "recipientPartnerType", "RCVPRT";
    RecipientPort => "recipientPort", "RCVPOR";
    SenderAddress => "senderAddress", "SNDSAD";
    SenderLogicalAddress => "senderLogicalAddress", "SNDLAD";
    SenderPartnerFunction => "senderPartnerFunction", "SNDPFC";
    SenderPartnerNumber => "senderPartnerNumber", "SNDPRN";
    SenderPartnerType => "senderPartnerType", "SNDPRT";
    SenderPort => "senderPort", "SNDPOR";
    Serialization => "serialization", "SERIAL";
    Status => "status", "STATUS";
    /// Non-empty marks a test message.
    TestFlag => "testFlag", "TEST";
}

impl std::fmt::Display for HeaderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.attribute())
    }
}

impl FromStr for HeaderField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_attribute(s).ok_or_else(|| format!("unknown header field: {s:?}"))
    }
}

/// The control header of one document. Unset fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    values: BTreeMap<HeaderField, String>,
}

impl Header {
    pub fn get(&self, field: HeaderField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: HeaderField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn unset(&mut self, field: HeaderField) -> Option<String> {
        self.values.remove(&field)
    }

    /// Set fields in [`HeaderField::all`] order.
    pub fn iter(&self) -> impl Iterator<Item = (HeaderField, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
