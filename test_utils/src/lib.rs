// SPDX-License-Identifier: MIT

pub mod samples;
pub mod tasks;
