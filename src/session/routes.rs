//! Pages and form fields of the game

pub const HOME: &str = "";
pub const LOGIN: &str = "connexion.php";
pub const LOGOUT: &str = "deconnexion.php";
pub const BONUS: &str = "bonus.php";
pub const BONUS_LINKS: [&str; 3] = ["bonus1.php", "bonus2.php", "bonus3.php"];
pub const MISSIONS: &str = "missions.php";
/// Issues a move; its answer is not up to date
pub const MOVE: &str = "carte2.php";
/// Map page: position, visible encounters, active combatant selection
pub const MAP: &str = "carte.php";
pub const BATTLE: &str = "combat.php";
pub const NPC: &str = "pnj.php";

// Battle form actions
pub const ACTION_ATTACK: &str = "attaque";
pub const ACTION_ITEM: &str = "objet";
pub const ACTION_CAPTURE: &str = "capture";
pub const ACTION_SWITCH: &str = "changer";
pub const ACTION_FLEE: &str = "fuite";
pub const ACTION_CONTINUE: &str = "suivant";
