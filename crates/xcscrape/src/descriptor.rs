// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Test descriptors and the frames the scraper keeps for open tests

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a suite or case within one scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorId(pub u64);

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a descriptor stands for a suite or a single case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    /// A `Test Suite` grouping
    Suite,
    /// A `Test Case` inside a suite
    Case,
}

/// The `Suite.Class case` triple named by a `'-[Suite.Class case]'` token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseName {
    /// Owning suite (the token before the dot)
    pub suite: String,
    /// Class-like grouping (the token after the dot)
    pub class_name: String,
    /// Test case name
    pub case: String,
}

/// Identity of a suite or case
///
/// A suite `'Foo'` has suite and class name `Foo` and no case name.
/// A case `'-[Foo.Bar baz]'` has suite `Foo`, class name `Bar` and case `baz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDescriptor {
    id: DescriptorId,
    kind: DescriptorKind,
    suite: String,
    class_name: String,
    case: Option<String>,
}

impl TestDescriptor {
    /// Create a suite descriptor
    #[must_use]
    pub fn suite(id: DescriptorId, suite: impl Into<String>) -> Self {
        let suite = suite.into();
        Self {
            id,
            kind: DescriptorKind::Suite,
            class_name: suite.clone(),
            suite,
            case: None,
        }
    }

    /// Create a case descriptor
    #[must_use]
    pub fn case(id: DescriptorId, name: CaseName) -> Self {
        Self {
            id,
            kind: DescriptorKind::Case,
            suite: name.suite,
            class_name: name.class_name,
            case: Some(name.case),
        }
    }

    /// Unique id within one scrape
    #[must_use]
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    /// Suite or case
    #[must_use]
    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    /// Suite name, the first token of a case name
    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite
    }

    /// Class name; for suites this is the suite name
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Case name, `None` for suites
    #[must_use]
    pub fn case_name(&self) -> Option<&str> {
        self.case.as_deref()
    }

    /// Display name: the case name for cases, the suite name for suites
    #[must_use]
    pub fn name(&self) -> &str {
        self.case.as_deref().unwrap_or(&self.suite)
    }

    /// Check whether this is the case `name`, comparing suite, class and case
    #[must_use]
    pub fn is_case(&self, name: &CaseName) -> bool {
        self.kind == DescriptorKind::Case
            && self.suite == name.suite
            && self.class_name == name.class_name
            && self.case.as_deref() == Some(name.case.as_str())
    }
}

impl fmt::Display for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.case {
            Some(case) => write!(f, "-[{}.{} {}]", self.suite, self.class_name, case),
            None => write!(f, "{}", self.suite),
        }
    }
}

/// An open suite or case on the context stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFrame {
    descriptor: TestDescriptor,
    messages: Vec<String>,
}

impl ContextFrame {
    /// An open frame with no messages yet
    #[must_use]
    pub fn new(descriptor: TestDescriptor) -> Self {
        Self {
            descriptor,
            messages: Vec::new(),
        }
    }

    /// The suite or case this frame tracks
    #[must_use]
    pub fn descriptor(&self) -> &TestDescriptor {
        &self.descriptor
    }

    /// Failure messages captured while the frame was open, oldest first
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Record a failure message reported for this case
    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Consume the frame, returning its descriptor and captured messages
    #[must_use]
    pub fn into_parts(self) -> (TestDescriptor, Vec<String>) {
        (self.descriptor, self.messages)
    }
}
