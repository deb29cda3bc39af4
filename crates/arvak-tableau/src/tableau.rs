//! Binary symplectic stabilizer tableau (Aaronson-Gottesman representation).

use crate::error::{TableauError, TableauResult};
use crate::gate::CliffordOp;

/// A stabilizer tableau tracking how Pauli operators transform under a
/// sequence of Clifford gates.
///
/// Each row is a Pauli string over `n` qubits represented as an `x` bit
/// vector, a `z` bit vector (bit `i` set means the operator has an X, Z, or
/// Y factor on qubit `i` depending on which of `x`/`z` are set), and a phase
/// bit for the overall `+1`/`-1` sign. When `include_destabilizers` is set,
/// the tableau tracks `2n` rows (n destabilizers followed by n stabilizers,
/// matching CHP); otherwise only the `n` stabilizer rows are tracked, which
/// is all the Clifford synthesizer needs to check target-unitary equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    num_qubits: usize,
    include_destabilizers: bool,
    x: Vec<Vec<bool>>,
    z: Vec<Vec<bool>>,
    phase: Vec<bool>,
}

impl Tableau {
    /// Builds the identity tableau: destabilizer row `i` is `X_i`,
    /// stabilizer row `i` is `Z_i`, matching the standard CHP initial state.
    #[must_use]
    pub fn new(num_qubits: usize, include_destabilizers: bool) -> Self {
        let rows = if include_destabilizers {
            2 * num_qubits
        } else {
            num_qubits
        };
        let mut x = vec![vec![false; num_qubits]; rows];
        let mut z = vec![vec![false; num_qubits]; rows];
        let phase = vec![false; rows];

        if include_destabilizers {
            for i in 0..num_qubits {
                x[i][i] = true;
                z[num_qubits + i][i] = true;
            }
        } else {
            for i in 0..num_qubits {
                z[i][i] = true;
            }
        }

        Self {
            num_qubits,
            include_destabilizers,
            x,
            z,
            phase,
        }
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn includes_destabilizers(&self) -> bool {
        self.include_destabilizers
    }

    /// The `X` bit of row `r`, qubit `q`.
    #[must_use]
    pub fn x_bit(&self, row: usize, qubit: usize) -> bool {
        self.x[row][qubit]
    }

    /// The `Z` bit of row `r`, qubit `q`.
    #[must_use]
    pub fn z_bit(&self, row: usize, qubit: usize) -> bool {
        self.z[row][qubit]
    }

    /// The phase (sign) bit of row `r`.
    #[must_use]
    pub fn phase_bit(&self, row: usize) -> bool {
        self.phase[row]
    }

    fn check_qubit(&self, q: usize) -> TableauResult<()> {
        if q >= self.num_qubits {
            return Err(TableauError::QubitOutOfRange {
                index: q,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Hadamard on qubit `q`: swaps the X and Z components of every row,
    /// flipping phase where both were set.
    pub fn apply_h(&mut self, q: usize) -> TableauResult<()> {
        self.check_qubit(q)?;
        for r in 0..self.x.len() {
            self.phase[r] ^= self.x[r][q] && self.z[r][q];
            std::mem::swap(&mut self.x[r][q], &mut self.z[r][q]);
        }
        Ok(())
    }

    /// Phase gate (S) on qubit `q`.
    pub fn apply_s(&mut self, q: usize) -> TableauResult<()> {
        self.check_qubit(q)?;
        for r in 0..self.x.len() {
            self.phase[r] ^= self.x[r][q] && self.z[r][q];
            self.z[r][q] ^= self.x[r][q];
        }
        Ok(())
    }

    /// S-dagger on qubit `q`, realized as three applications of S (`S^4 = I`
    /// so `S^3 = S^-1`).
    pub fn apply_sdg(&mut self, q: usize) -> TableauResult<()> {
        for _ in 0..3 {
            self.apply_s(q)?;
        }
        Ok(())
    }

    /// Pauli X on qubit `q`: flips the sign of rows with a Z component.
    pub fn apply_x(&mut self, q: usize) -> TableauResult<()> {
        self.check_qubit(q)?;
        for r in 0..self.x.len() {
            self.phase[r] ^= self.z[r][q];
        }
        Ok(())
    }

    /// Pauli Z on qubit `q`: flips the sign of rows with an X component.
    pub fn apply_z(&mut self, q: usize) -> TableauResult<()> {
        self.check_qubit(q)?;
        for r in 0..self.x.len() {
            self.phase[r] ^= self.x[r][q];
        }
        Ok(())
    }

    /// Pauli Y on qubit `q` (`Y = iXZ` up to global phase).
    pub fn apply_y(&mut self, q: usize) -> TableauResult<()> {
        self.check_qubit(q)?;
        for r in 0..self.x.len() {
            self.phase[r] ^= self.x[r][q] ^ self.z[r][q];
        }
        Ok(())
    }

    /// CNOT with `control` and `target`.
    pub fn apply_cx(&mut self, control: usize, target: usize) -> TableauResult<()> {
        self.check_qubit(control)?;
        self.check_qubit(target)?;
        for r in 0..self.x.len() {
            let (xc, zc, xt, zt) = (
                self.x[r][control],
                self.z[r][control],
                self.x[r][target],
                self.z[r][target],
            );
            self.phase[r] ^= xc && zt && (xt ^ zc ^ true);
            self.x[r][target] = xt ^ xc;
            self.z[r][control] = zc ^ zt;
        }
        Ok(())
    }

    /// SWAP of `a` and `b`, realized as a pure column permutation (no phase
    /// change, since SWAP has no `-1` eigenvalue contribution on any Pauli).
    pub fn apply_swap(&mut self, a: usize, b: usize) -> TableauResult<()> {
        self.check_qubit(a)?;
        self.check_qubit(b)?;
        for r in 0..self.x.len() {
            self.x[r].swap(a, b);
            self.z[r].swap(a, b);
        }
        Ok(())
    }

    /// Dispatches to the matching `apply_*` method.
    pub fn apply_gate(&mut self, op: CliffordOp) -> TableauResult<()> {
        match op {
            CliffordOp::H(q) => self.apply_h(q),
            CliffordOp::S(q) => self.apply_s(q),
            CliffordOp::Sdg(q) => self.apply_sdg(q),
            CliffordOp::X(q) => self.apply_x(q),
            CliffordOp::Y(q) => self.apply_y(q),
            CliffordOp::Z(q) => self.apply_z(q),
            CliffordOp::Cx(c, t) => self.apply_cx(c, t),
            CliffordOp::Swap(a, b) => self.apply_swap(a, b),
        }
    }

    /// Row-wise equality: two tableaux represent the same stabilizer group
    /// iff their rows match exactly (rows are normalized by construction,
    /// so no canonicalization is needed for tableaux built purely from
    /// gate application starting at the identity).
    #[must_use]
    pub fn equals(&self, other: &Tableau) -> bool {
        self.num_qubits == other.num_qubits
            && self.x == other.x
            && self.z == other.z
            && self.phase == other.phase
    }

    /// Serializes to one line per row: a sign character followed by `n` `X`
    /// bits then `n` `Z` bits, e.g. `+1010`.
    #[must_use]
    pub fn to_string_repr(&self) -> String {
        let mut out = String::new();
        for r in 0..self.x.len() {
            out.push(if self.phase[r] { '-' } else { '+' });
            for &b in &self.x[r] {
                out.push(if b { '1' } else { '0' });
            }
            for &b in &self.z[r] {
                out.push(if b { '1' } else { '0' });
            }
            out.push('\n');
        }
        out
    }

    /// Parses the format produced by [`Tableau::to_string_repr`].
    pub fn from_string(text: &str, num_qubits: usize) -> TableauResult<Self> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        let rows = lines.len();
        if rows != num_qubits && rows != 2 * num_qubits {
            return Err(TableauError::FormatError(format!(
                "expected {num_qubits} or {} rows, found {rows}",
                2 * num_qubits
            )));
        }
        let include_destabilizers = rows == 2 * num_qubits;

        let mut x = Vec::with_capacity(rows);
        let mut z = Vec::with_capacity(rows);
        let mut phase = Vec::with_capacity(rows);

        for line in lines {
            let bytes = line.as_bytes();
            if bytes.len() != 1 + 2 * num_qubits {
                return Err(TableauError::FormatError(format!(
                    "row '{line}' has wrong length"
                )));
            }
            let sign = match bytes[0] {
                b'+' => false,
                b'-' => true,
                other => {
                    return Err(TableauError::FormatError(format!(
                        "expected sign '+'/'-', found '{}'",
                        other as char
                    )));
                }
            };
            let parse_bits = |slice: &[u8]| -> TableauResult<Vec<bool>> {
                slice
                    .iter()
                    .map(|&c| match c {
                        b'0' => Ok(false),
                        b'1' => Ok(true),
                        other => Err(TableauError::FormatError(format!(
                            "expected bit '0'/'1', found '{}'",
                            other as char
                        ))),
                    })
                    .collect()
            };
            x.push(parse_bits(&bytes[1..1 + num_qubits])?);
            z.push(parse_bits(&bytes[1 + num_qubits..])?);
            phase.push(sign);
        }

        Ok(Self {
            num_qubits,
            include_destabilizers,
            x,
            z,
            phase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_tableau_has_z_stabilizers() {
        let t = Tableau::new(2, false);
        assert_eq!(t.num_rows(), 2);
        assert!(!t.phase[0]);
    }

    #[test]
    fn h_then_h_is_identity() {
        let mut t = Tableau::new(1, false);
        let identity = t.clone();
        t.apply_h(0).unwrap();
        t.apply_h(0).unwrap();
        assert!(t.equals(&identity));
    }

    #[test]
    fn s_to_the_fourth_is_identity() {
        let mut t = Tableau::new(1, false);
        let identity = t.clone();
        for _ in 0..4 {
            t.apply_s(0).unwrap();
        }
        assert!(t.equals(&identity));
    }

    #[test]
    fn sdg_inverts_s() {
        let mut t = Tableau::new(1, true);
        let identity = t.clone();
        t.apply_s(0).unwrap();
        t.apply_sdg(0).unwrap();
        assert!(t.equals(&identity));
    }

    #[test]
    fn cx_is_self_inverse() {
        let mut t = Tableau::new(2, true);
        let identity = t.clone();
        t.apply_cx(0, 1).unwrap();
        t.apply_cx(0, 1).unwrap();
        assert!(t.equals(&identity));
    }

    #[test]
    fn h_conjugates_x_to_z() {
        // H maps the X-on-qubit-0 stabilizer generator to Z-on-qubit-0.
        let mut t = Tableau::new(1, true);
        t.apply_h(0).unwrap();
        // Destabilizer row 0 started as X_0, should now be Z_0.
        assert!(!t.x[0][0]);
        assert!(t.z[0][0]);
    }

    #[test]
    fn three_cx_and_reorder_realize_swap() {
        let mut via_cx = Tableau::new(2, true);
        via_cx.apply_cx(0, 1).unwrap();
        via_cx.apply_cx(1, 0).unwrap();
        via_cx.apply_cx(0, 1).unwrap();

        let mut via_swap = Tableau::new(2, true);
        via_swap.apply_swap(0, 1).unwrap();

        assert!(via_cx.equals(&via_swap));
    }

    #[test]
    fn string_round_trip() {
        let mut t = Tableau::new(2, true);
        t.apply_h(0).unwrap();
        t.apply_cx(0, 1).unwrap();
        let text = t.to_string_repr();
        let parsed = Tableau::from_string(&text, 2).unwrap();
        assert!(t.equals(&parsed));
    }

    #[test]
    fn out_of_range_qubit_errors() {
        let mut t = Tableau::new(2, false);
        assert!(t.apply_h(5).is_err());
    }
}
