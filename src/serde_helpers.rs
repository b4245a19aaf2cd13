//! The wire format for ops. Ops are written as `{"Retain":{"len":3}}` or
//! `{"Replace":{"delete":"a","insert":"b"}}`, and an operation is a plain list of ops.

use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;

use crate::error::OpError;
use crate::op::Op;

/// Mirror of [`Op`] used for (de)serialization. Lengths are signed on the wire, so invalid input
/// can be rejected instead of wrapping.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) enum OpWire {
    Retain { len: i64 },
    Replace { delete: SmartString, insert: SmartString },
}

impl From<Op> for OpWire {
    fn from(op: Op) -> Self {
        match op {
            // Saturates. No document that long fits in memory.
            Op::Retain(len) => OpWire::Retain { len: i64::try_from(len).unwrap_or(i64::MAX) },
            Op::Replace { delete, insert } => OpWire::Replace { delete, insert },
        }
    }
}

impl TryFrom<OpWire> for Op {
    type Error = OpError;

    fn try_from(wire: OpWire) -> Result<Self, Self::Error> {
        match wire {
            OpWire::Retain { len } => {
                usize::try_from(len).map(Op::Retain).map_err(|_| OpError::NegativeLength(len))
            }
            OpWire::Replace { delete, insert } => Ok(Op::Replace { delete, insert }),
        }
    }
}
