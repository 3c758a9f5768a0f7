mod bson;
mod document;
mod macros;
mod props;
mod ser;
