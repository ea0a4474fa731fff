pub use shakmaty::{Piece, Role};

/// Pieces a pawn may promote to, in ascending order.
pub const PROMOTIONS: [Role; 4] = [Role::Knight, Role::Bishop, Role::Rook, Role::Queen];

/// Pieces whose blocked requests are shortened along their line instead of voided.
pub const fn slides_when_blocked(role: Role) -> bool {
    matches!(role, Role::Pawn | Role::Rook | Role::Bishop | Role::Queen)
}

pub fn role_from_symbol(symbol: char) -> Option<Role> {
    Role::from_char(symbol.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Color;

    #[test]
    fn symbols_encode_colour_by_case() {
        let knight = Piece {
            color: Color::White,
            role: Role::Knight,
        };
        assert_eq!(knight.char(), 'N');
        assert_eq!(Piece::from_char('N'), Some(knight));
        assert_eq!(role_from_symbol('Q'), Some(Role::Queen));
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn knights_and_kings_never_slide() {
        assert!(!slides_when_blocked(Role::Knight));
        assert!(!slides_when_blocked(Role::King));
        assert!(slides_when_blocked(Role::Pawn));
        assert!(slides_when_blocked(Role::Queen));
    }
}
