// Copyright (c) 2024 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

mod ast;
mod charwithposition;
mod compiler;
mod error;
mod errorprinter;
mod instance;
mod location;
mod peekableiter;
mod printer;
mod route;
mod rulechecker;
mod traditional;

pub mod demo;
pub mod process;

pub use error::RegexError;
pub use errorprinter::print_error;
pub use location::Location;
pub use process::{Regex, RegexBuilder};
