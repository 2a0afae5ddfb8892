// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access Control
//!
//! Every read or write of a contact, event, recipient or gift goes through
//! [`AccessControl::authorize`] before the store is touched.
//!
//! ## Rules
//!
//! 1. The owner may do anything. Recipients and gifts are owned by the
//!    owner of their event.
//! 2. Anyone else needs a grant on the nearest shareable ancestor (the
//!    contact itself, or the event).
//! 3. No grant: the resource is hidden and reported as not found.
//! 4. A grant allows what its [`Permission`] covers; anything else is
//!    forbidden. Sharing and adding recipients stay with the owner.

pub mod control;
pub mod decision;
pub mod permission;

pub use control::{AccessControl, Authorized, Ownership, Resource, ShareTarget};
pub use decision::{decide, AccessBasis, AccessDecision, DenyReason};
pub use permission::{Action, Permission};
