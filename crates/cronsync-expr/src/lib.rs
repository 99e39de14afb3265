//! # cronsync Expressions
//!
//! Materializes job parameters at fire time.
//!
//! Placeholders of the form `${NAME[±Nunit]*[:pattern]}` are replaced with
//! dates relative to "today":
//!
//! | placeholder | value on 2024-03-15 |
//! |---|---|
//! | `${TODAY}` | `2024-03-15` |
//! | `${YESTERDAY}` | `2024-03-14` |
//! | `${MONTH-1M}` | `2024-02` |
//! | `${(TODAY + 1W):yyyyMMdd}` | `20240322` |
//! | `${YEAR}` | `2024` |
//!
//! Units are `D` (days), `W` (weeks), `M` (months) and `Y` (years). URLs may
//! carry a resource prefix (`uri://`, `file://`, `ftp://`, `hdfs://`) that is
//! stripped by [`DateExpressionEvaluator::normalize`].

mod clock;
mod error;
mod evaluator;
mod pattern;
mod protocol;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ExprError;
pub use evaluator::{DateExpressionEvaluator, DateToken, ProxyRewrite, RESULT_KEY};
pub use protocol::{ApiFormat, ApiProtocol};
