mod document;

pub use document::{
    AttributeDataType, AttributeDefinition, AttributeValue, BaudRate, Comment, Endianness,
    FileDocument, FileSummary, Message, MuxType, Node, RawSection, Signal, ValueTable,
};
