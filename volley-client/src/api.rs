use std::{fmt, str::FromStr};

use log::info;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use volley_core::{
    ApplicationId, TournamentId, UnknownVariant, UserId, UserRole,
    stats::{RankedTeam, TeamRecord, rank_teams},
};
use volley_schema::{Schema, application::ReviewApplicationPayload, check, user::LoginPayload};

use crate::{ApiRequest, ClientError, Session, Tokens, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Players,
    Teams,
    Tournaments,
    Applications,
    Matches,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Users => "/users",
            Resource::Players => "/players",
            Resource::Teams => "/teams",
            Resource::Tournaments => "/tournaments",
            Resource::Applications => "/applications",
            Resource::Matches => "/matches",
        }
    }

    fn item_path(&self, id: impl fmt::Display) -> String {
        format!("{}/{}", self.path(), id)
    }
}

impl FromStr for Resource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Resource::Users),
            "players" => Ok(Resource::Players),
            "teams" => Ok(Resource::Teams),
            "tournaments" => Ok(Resource::Tournaments),
            "applications" => Ok(Resource::Applications),
            "matches" => Ok(Resource::Matches),
            _ => Err(UnknownVariant {
                kind: "resource",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl ListQuery {
    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(page) = self.page {
            request = request.with_query("page", page);
        }
        if let Some(limit) = self.limit {
            request = request.with_query("limit", limit);
        }
        if let Some(search) = &self.search {
            request = request.with_query("search", search);
        }
        request
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: Option<String>,
    user: UserProfile,
}

/// Typed access to the club REST API. Every payload is checked against its
/// schema before anything goes over the wire.
pub struct ApiClient<T> {
    transport: T,
    session: Session,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, session: Session) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn login(&self, credentials: &LoginPayload) -> Result<UserProfile, ClientError> {
        check(credentials)?;
        let request = ApiRequest::post("/auth/login").with_json(serde_json::to_value(credentials)?);
        let resp: LoginResponse = self.transport.send(&request).await?.json()?;
        self.session
            .set(Tokens {
                access_token: resp.access_token,
                refresh_token: resp.refresh_token,
            })
            .await;
        info!("Signed in as {} ({})", resp.user.email, resp.user.role);
        Ok(resp.user)
    }

    pub async fn logout(&self) {
        self.session.clear().await;
    }

    pub async fn list<R: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<Vec<R>, ClientError> {
        let request = query.apply(ApiRequest::get(resource.path()));
        self.transport.send(&request).await?.json()
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        resource: Resource,
        id: impl fmt::Display,
    ) -> Result<R, ClientError> {
        let request = ApiRequest::get(resource.item_path(id));
        self.transport.send(&request).await?.json()
    }

    pub async fn create<P, R>(&self, resource: Resource, payload: &P) -> Result<R, ClientError>
    where
        P: Schema + Serialize + Sync,
        R: DeserializeOwned,
    {
        check(payload)?;
        let request = ApiRequest::post(resource.path()).with_json(serde_json::to_value(payload)?);
        self.transport.send(&request).await?.json()
    }

    pub async fn update<P, R>(
        &self,
        resource: Resource,
        id: impl fmt::Display,
        payload: &P,
    ) -> Result<R, ClientError>
    where
        P: Schema + Serialize + Sync,
        R: DeserializeOwned,
    {
        check(payload)?;
        let request =
            ApiRequest::put(resource.item_path(id)).with_json(serde_json::to_value(payload)?);
        self.transport.send(&request).await?.json()
    }

    pub async fn delete(&self, resource: Resource, id: impl fmt::Display) -> Result<(), ClientError> {
        let request = ApiRequest::delete(resource.item_path(id));
        self.transport.send(&request).await?.error_for_status()
    }

    pub async fn approve_application<R: DeserializeOwned>(
        &self,
        id: ApplicationId,
    ) -> Result<R, ClientError> {
        self.review_application(id, "approve", &ReviewApplicationPayload::approve())
            .await
    }

    pub async fn reject_application<R: DeserializeOwned>(
        &self,
        id: ApplicationId,
        note: &str,
    ) -> Result<R, ClientError> {
        self.review_application(id, "reject", &ReviewApplicationPayload::reject(note))
            .await
    }

    async fn review_application<R: DeserializeOwned>(
        &self,
        id: ApplicationId,
        action: &str,
        review: &ReviewApplicationPayload,
    ) -> Result<R, ClientError> {
        check(review)?;
        let path = format!("{}/{}", Resource::Applications.item_path(id), action);
        let request = ApiRequest::post(path).with_json(serde_json::to_value(review)?);
        self.transport.send(&request).await?.json()
    }

    /// Fetches season records and ranks them locally.
    pub async fn team_standings(
        &self,
        tournament: Option<TournamentId>,
    ) -> Result<Vec<RankedTeam>, ClientError> {
        let mut request = ApiRequest::get("/teams/stats");
        if let Some(tournament) = tournament {
            request = request.with_query("tournamentId", tournament);
        }
        let records: Vec<TeamRecord> = self.transport.send(&request).await?.json()?;
        Ok(rank_teams(&records))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use volley_core::{PlayerPosition, TeamId};
    use volley_schema::{player::UpdatePlayerPayload, team::CreateTeamPayload};

    use super::*;
    use crate::{Method, transport::MockTransport};

    fn client(mock: &MockTransport) -> ApiClient<MockTransport> {
        ApiClient::new(mock.clone(), Session::default())
    }

    fn team(name: &str) -> CreateTeamPayload {
        CreateTeamPayload {
            name: name.to_string(),
            division_id: None,
            coach_id: None,
            assistant_coach_id: None,
            description: None,
            founded_year: Some(2015),
            min_members: 6,
            max_members: 12,
            home_court: None,
        }
    }

    #[tokio::test]
    async fn test_login_stores_tokens() {
        let mock = MockTransport::default();
        let user_id = UserId::new();
        mock.respond(
            200,
            &json!({
                "accessToken": "a1",
                "refreshToken": "r1",
                "user": {
                    "id": user_id,
                    "email": "admin@club.vn",
                    "fullName": "Club Admin",
                    "role": "ADMIN",
                },
            })
            .to_string(),
        );
        let client = client(&mock);
        let user = client
            .login(&LoginPayload {
                email: "admin@club.vn".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(client.session().access_token().await.as_deref(), Some("a1"));

        let request = &mock.get_requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/auth/login");

        client.logout().await;
        assert!(!client.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_invalid_payload_is_never_sent() {
        let mock = MockTransport::default();
        let client = client(&mock);
        let result: Result<Value, _> = client.create(Resource::Teams, &team("X")).await;
        match result {
            Err(ClientError::Validation(err)) => assert!(err.has_issue_at("name")),
            other => panic!("unexpected result: {:?}", other),
        }

        let login = client
            .login(&LoginPayload {
                email: "nope".to_string(),
                password: "secret123".to_string(),
            })
            .await;
        assert!(matches!(login, Err(ClientError::Validation(_))));
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_crud_paths() {
        let mock = MockTransport::default();
        mock.respond(201, r#"{"id": "t1"}"#)
            .respond(200, "[]")
            .respond(200, r#"{"id": "p1"}"#)
            .respond(204, "");
        let client = client(&mock);
        let player_id = "p1";

        let created: Value = client.create(Resource::Teams, &team("Hue Aces")).await.unwrap();
        assert_eq!(created["id"], "t1");

        let query = ListQuery {
            page: Some(2),
            search: Some("Nguyen".to_string()),
            ..Default::default()
        };
        let players: Vec<Value> = client.list(Resource::Players, &query).await.unwrap();
        assert!(players.is_empty());

        let update = UpdatePlayerPayload {
            positions: Some(vec![PlayerPosition::Libero]),
            ..Default::default()
        };
        let _: Value = client
            .update(Resource::Players, player_id, &update)
            .await
            .unwrap();
        client.delete(Resource::Players, player_id).await.unwrap();

        let requests = mock.get_requests();
        assert_eq!(requests[0].path, "/teams");
        assert_eq!(requests[0].body.as_ref().unwrap()["maxMembers"], 12);
        assert_eq!(
            requests[1].query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "Nguyen".to_string())
            ]
        );
        assert_eq!(requests[2].method, Method::Put);
        assert_eq!(requests[2].path, "/players/p1");
        assert_eq!(
            requests[2].body,
            Some(json!({"positions": ["LIBERO"]}))
        );
        assert_eq!(requests[3].method, Method::Delete);
    }

    #[tokio::test]
    async fn test_delete_reports_status() {
        let mock = MockTransport::default();
        mock.respond(409, r#"{"message": "Team still has players"}"#);
        let client = client(&mock);
        match client.delete(Resource::Teams, "t1").await {
            Err(ClientError::Status { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Team still has players");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_review_application() {
        let mock = MockTransport::default();
        mock.respond(200, r#"{"status": "APPROVED"}"#)
            .respond(200, r#"{"status": "REJECTED"}"#);
        let client = client(&mock);
        let id = ApplicationId::new();

        let approved: Value = client.approve_application(id).await.unwrap();
        assert_eq!(approved["status"], "APPROVED");
        let _: Value = client.reject_application(id, "Roster is full").await.unwrap();

        let requests = mock.get_requests();
        assert_eq!(requests[0].path, format!("/applications/{}/approve", id));
        assert_eq!(
            requests[1].body,
            Some(json!({"decision": "REJECTED", "reviewNote": "Roster is full"}))
        );

        let blank: Result<Value, _> = client.reject_application(id, " ").await;
        assert!(matches!(blank, Err(ClientError::Validation(_))));
        assert_eq!(mock.get_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_team_standings() {
        let (a, b) = (TeamId::new(), TeamId::new());
        let mock = MockTransport::default();
        mock.respond(
            200,
            &json!([
                {"teamId": b, "name": "B", "matchesPlayed": 12, "wins": 10, "losses": 2,
                 "pointsFor": 280, "pointsAgainst": 250},
                {"teamId": a, "name": "A", "matchesPlayed": 12, "wins": 10, "losses": 2,
                 "pointsFor": 300, "pointsAgainst": 200},
            ])
            .to_string(),
        );
        let client = client(&mock);
        let tournament = TournamentId::new();
        let standings = client.team_standings(Some(tournament)).await.unwrap();
        assert_eq!(standings[0].record.team_id, a);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[1].rank, 2);
        assert_eq!(
            mock.get_requests()[0].query,
            vec![("tournamentId".to_string(), tournament.to_string())]
        );
    }

    #[test]
    fn test_resource_names() {
        assert_eq!("players".parse::<Resource>(), Ok(Resource::Players));
        assert!("games".parse::<Resource>().is_err());
    }
}
