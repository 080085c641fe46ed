use chrono::{NaiveDate, NaiveTime};
use league_api::{
    LeagueError, NewMatch, NewPlayer, NewTeam, Player, PlayerId, Position, Team, TeamId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Team,
    Player { editing: Option<PlayerId> },
    Match,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        Self { label, value: String::new(), secret: false }
    }

    fn with_value(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into(), secret: false }
    }
}

/// A modal form: one line of text per field, one focused field at a time.
#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    /// Active flag carried through an edit; the form has no field for it.
    pub active: bool,
}

impl FormState {
    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self { kind, fields, focus: 0, active: true }
    }

    pub fn login() -> Self {
        Self::new(
            FormKind::Login,
            vec![
                FormField::new("Email"),
                FormField { secret: true, ..FormField::new("Password") },
            ],
        )
    }

    pub fn team() -> Self {
        Self::new(
            FormKind::Team,
            vec![
                FormField::new("Name"),
                FormField::new("Representative"),
                FormField::new("Phone"),
                FormField::new("Email"),
            ],
        )
    }

    /// Blank registration form, or an edit form pre-filled from `player`.
    pub fn player(player: Option<&Player>, teams: &[Team]) -> Self {
        let Some(p) = player else {
            return Self::new(
                FormKind::Player { editing: None },
                vec![
                    FormField::new("Name"),
                    FormField::new("Team"),
                    FormField::new("Jersey"),
                    FormField::new("Position"),
                    FormField::new("Date of birth"),
                    FormField::new("Phone"),
                    FormField::new("Email"),
                ],
            );
        };
        let team_name = teams
            .iter()
            .find(|t| t.id == p.team_id)
            .map(|t| t.name.clone())
            .unwrap_or_default();
        let mut form = Self::new(
            FormKind::Player { editing: Some(p.id.clone()) },
            vec![
                FormField::with_value("Name", &p.name),
                FormField::with_value("Team", team_name),
                FormField::with_value(
                    "Jersey",
                    p.jersey_number.map(|n| n.to_string()).unwrap_or_default(),
                ),
                FormField::with_value("Position", p.position.map(|pos| pos.label()).unwrap_or_default()),
                FormField::with_value(
                    "Date of birth",
                    p.date_of_birth.map(|d| d.to_string()).unwrap_or_default(),
                ),
                FormField::with_value("Phone", p.contact_phone.clone().unwrap_or_default()),
                FormField::with_value("Email", p.contact_email.clone().unwrap_or_default()),
            ],
        );
        form.active = p.is_active;
        form
    }

    pub fn fixture() -> Self {
        Self::new(
            FormKind::Match,
            vec![
                FormField::new("Match day"),
                FormField::new("Home team"),
                FormField::new("Away team"),
                FormField::new("Date"),
                FormField::new("Kick-off"),
                FormField::new("Venue"),
            ],
        )
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Login => " Admin Login ",
            FormKind::Team => " Register Team ",
            FormKind::Player { editing: None } => " Register Player ",
            FormKind::Player { editing: Some(_) } => " Edit Player ",
            FormKind::Match => " Schedule Match ",
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len().max(1);
    }

    pub fn prev_field(&mut self) {
        let len = self.fields.len().max(1);
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.trim())
            .unwrap_or_default()
    }

    fn optional(&self, label: &str) -> Option<String> {
        Some(self.value(label)).filter(|v| !v.is_empty()).map(str::to_string)
    }
}

fn invalid(msg: impl Into<String>) -> LeagueError {
    LeagueError::InvalidInput(msg.into())
}

/// Exact name first (any case), otherwise a unique prefix.
pub fn resolve_team<'a>(teams: &'a [Team], name: &str) -> Result<&'a Team, LeagueError> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return Err(invalid("a team is required"));
    }
    if let Some(team) = teams.iter().find(|t| t.name.to_lowercase() == needle) {
        return Ok(team);
    }
    let mut candidates = teams.iter().filter(|t| t.name.to_lowercase().starts_with(&needle));
    match (candidates.next(), candidates.next()) {
        (Some(team), None) => Ok(team),
        (Some(_), Some(_)) => Err(invalid(format!("\"{}\" matches more than one team", name.trim()))),
        (None, _) => Err(invalid(format!("no team named \"{}\"", name.trim()))),
    }
}

fn parse_date(value: &str, what: &str) -> Result<NaiveDate, LeagueError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid(format!("{what} must be YYYY-MM-DD")))
}

pub fn login_credentials(form: &FormState) -> (String, String) {
    let password = form
        .fields
        .iter()
        .find(|f| f.label == "Password")
        .map(|f| f.value.clone())
        .unwrap_or_default();
    (form.value("Email").to_string(), password)
}

pub fn parse_team(form: &FormState) -> Result<NewTeam, LeagueError> {
    let team = NewTeam {
        name: form.value("Name").to_string(),
        representative_name: form.optional("Representative"),
        contact_phone: form.optional("Phone"),
        contact_email: form.optional("Email"),
        is_active: true,
    };
    team.validate()?;
    Ok(team)
}

pub fn parse_player(form: &FormState, teams: &[Team]) -> Result<NewPlayer, LeagueError> {
    let team_id: TeamId = resolve_team(teams, form.value("Team"))?.id.clone();
    let jersey_number = match form.value("Jersey") {
        "" => None,
        v => Some(v.parse::<u32>().map_err(|_| invalid("jersey must be a whole number"))?),
    };
    let position = match form.value("Position") {
        "" => None,
        v => Some(Position::parse(v).ok_or_else(|| {
            invalid("position must be Goalkeeper, Defender, Midfielder or Forward")
        })?),
    };
    let date_of_birth = match form.value("Date of birth") {
        "" => None,
        v => Some(parse_date(v, "date of birth")?),
    };
    let player = NewPlayer {
        name: form.value("Name").to_string(),
        team_id,
        jersey_number,
        position,
        date_of_birth,
        contact_phone: form.optional("Phone"),
        contact_email: form.optional("Email"),
        is_active: form.active,
    };
    player.validate()?;
    Ok(player)
}

pub fn parse_match(form: &FormState, teams: &[Team]) -> Result<NewMatch, LeagueError> {
    let match_day = form
        .value("Match day")
        .parse::<u32>()
        .map_err(|_| invalid("match day must be a number"))?;
    let home_team_id = resolve_team(teams, form.value("Home team"))?.id.clone();
    let away_team_id = resolve_team(teams, form.value("Away team"))?.id.clone();
    let match_date = parse_date(form.value("Date"), "date")?;
    let match_time = match form.value("Kick-off") {
        "" => None,
        v => Some(
            NaiveTime::parse_from_str(v, "%H:%M")
                .map_err(|_| invalid("kick-off must be HH:MM"))?,
        ),
    };
    let fixture = NewMatch {
        match_day,
        home_team_id,
        away_team_id,
        match_date,
        match_time,
        venue: form.optional("Venue"),
    };
    fixture.validate()?;
    Ok(fixture)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams() -> Vec<Team> {
        ["Class of 1998", "Class of 2003", "Old Boys"]
            .iter()
            .enumerate()
            .map(|(i, name)| Team {
                id: format!("team-{}", i + 1),
                name: name.to_string(),
                is_active: true,
                ..Default::default()
            })
            .collect()
    }

    fn fill(form: &mut FormState, values: &[&str]) {
        for (field, value) in form.fields.iter_mut().zip(values) {
            field.value = value.to_string();
        }
    }

    #[test]
    fn test_resolve_team_by_name_or_prefix() {
        let teams = teams();
        assert_eq!(resolve_team(&teams, "old boys").unwrap().id, "team-3");
        assert_eq!(resolve_team(&teams, "Class of 20").unwrap().id, "team-2");
        assert!(resolve_team(&teams, "Class").is_err());
        assert!(resolve_team(&teams, "Nobody").is_err());
    }

    #[test]
    fn test_parse_player() {
        let mut form = FormState::player(None, &[]);
        fill(&mut form, &["Jane Doe", "old", "9", "fw", "1990-05-01", "", "jane@example.com"]);
        let player = parse_player(&form, &teams()).unwrap();
        assert_eq!(player.team_id, "team-3");
        assert_eq!(player.jersey_number, Some(9));
        assert_eq!(player.position, Some(Position::Forward));
        assert_eq!(player.contact_phone, None);
        assert_eq!(player.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 1));
    }

    #[test]
    fn test_parse_player_rejects_bad_jersey() {
        let mut form = FormState::player(None, &[]);
        fill(&mut form, &["Jane Doe", "Old Boys", "nine"]);
        assert!(parse_player(&form, &teams()).is_err());
    }

    #[test]
    fn test_edit_form_round_trips_existing_player() {
        let teams = teams();
        let existing = Player {
            id: "player-7".into(),
            name: "Sam Reid".into(),
            team_id: "team-1".into(),
            jersey_number: Some(4),
            position: Some(Position::Defender),
            is_active: true,
            ..Default::default()
        };
        let form = FormState::player(Some(&existing), &teams);
        assert_eq!(form.kind, FormKind::Player { editing: Some("player-7".into()) });
        let parsed = parse_player(&form, &teams).unwrap();
        assert_eq!(parsed.team_id, "team-1");
        assert_eq!(parsed.jersey_number, Some(4));
        assert_eq!(parsed.position, Some(Position::Defender));
    }

    #[test]
    fn test_edit_form_keeps_inactive_player_inactive() {
        let teams = teams();
        let retired = Player {
            id: "player-8".into(),
            name: "Tom Hale".into(),
            team_id: "team-2".into(),
            is_active: false,
            ..Default::default()
        };
        let form = FormState::player(Some(&retired), &teams);
        assert!(!parse_player(&form, &teams).unwrap().is_active);

        let mut blank = FormState::player(None, &teams);
        fill(&mut blank, &["New Boy", "Old Boys"]);
        assert!(parse_player(&blank, &teams).unwrap().is_active);
    }

    #[test]
    fn test_parse_match() {
        let mut form = FormState::fixture();
        fill(&mut form, &["4", "Class of 1998", "old boys", "2025-04-05", "14:30", "School Ground"]);
        let fixture = parse_match(&form, &teams()).unwrap();
        assert_eq!(fixture.match_day, 4);
        assert_eq!(fixture.away_team_id, "team-3");
        assert_eq!(fixture.match_time, NaiveTime::from_hms_opt(14, 30, 0));
    }

    #[test]
    fn test_parse_match_rejects_same_team() {
        let mut form = FormState::fixture();
        fill(&mut form, &["1", "Old Boys", "old boys", "2025-04-05"]);
        assert!(parse_match(&form, &teams()).is_err());
    }

    #[test]
    fn test_parse_team_requires_name() {
        let mut form = FormState::team();
        fill(&mut form, &["   ", "Rep"]);
        assert!(parse_team(&form).is_err());
        fill(&mut form, &["Class of 2022", "", "", "c22@example.com"]);
        let team = parse_team(&form).unwrap();
        assert_eq!(team.representative_name, None);
        assert_eq!(team.contact_email.as_deref(), Some("c22@example.com"));
    }

    #[test]
    fn test_field_focus_wraps() {
        let mut form = FormState::login();
        form.prev_field();
        assert_eq!(form.focus, 1);
        form.next_field();
        assert_eq!(form.focus, 0);
        form.push_char('a');
        form.backspace();
        form.push_char('b');
        assert_eq!(login_credentials(&form).0, "b");
    }
}
