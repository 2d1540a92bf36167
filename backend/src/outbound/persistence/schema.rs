//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered users, auto-created on first authentication.
    users (id) {
        /// Primary key.
        id -> Int8,
        /// External identity provider subject; unique, immutable.
        subject -> Varchar,
        /// E-mail address; unique, used to address invites.
        email -> Varchar,
        /// Display name derived from verifier claims.
        display_name -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Spaces: named groups of users sharing commitments.
    spaces (id) {
        /// Primary key.
        id -> Int8,
        /// Display name.
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Owner; permanent.
        created_by -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership rows, one per (user, space); the row id is the invite
    /// handle.
    space_members (id) {
        /// Primary key.
        id -> Int8,
        /// The member or invitee.
        user_id -> Int8,
        /// The space.
        space_id -> Int8,
        /// PENDING, APPROVED, or REJECTED.
        status -> Varchar,
        /// Invite or join timestamp.
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Commitments and their lifecycle status.
    commitments (id) {
        /// Primary key.
        id -> Int8,
        /// Owning space.
        space_id -> Int8,
        /// Title.
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// DRAFT, REVIEW, or LOCKED.
        status -> Varchar,
        /// Creator; always an approver.
        created_by -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Optional deadline (midnight UTC of the supplied date).
        deadline -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Approver rows, one per (commitment, user).
    commitment_approvers (id) {
        /// Primary key.
        id -> Int8,
        /// The commitment.
        commitment_id -> Int8,
        /// The approving user.
        user_id -> Int8,
        /// PENDING, APPROVED, or REJECTED.
        status -> Varchar,
        /// When the approver acted; cleared on round restart.
        acted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only audit trail; rows are never updated or deleted.
    commitment_events (id) {
        /// Primary key.
        id -> Int8,
        /// The commitment.
        commitment_id -> Int8,
        /// The acting user.
        actor_id -> Int8,
        /// Transition tag, e.g. SENT_FOR_REVIEW.
        event_type -> Varchar,
        /// Opaque payload, stored verbatim.
        payload -> Nullable<Jsonb>,
        /// Creation timestamp; orders the trail.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(spaces -> users (created_by));
diesel::joinable!(space_members -> users (user_id));
diesel::joinable!(space_members -> spaces (space_id));
diesel::joinable!(commitments -> spaces (space_id));
diesel::joinable!(commitment_approvers -> commitments (commitment_id));
diesel::joinable!(commitment_approvers -> users (user_id));
diesel::joinable!(commitment_events -> commitments (commitment_id));
diesel::joinable!(commitment_events -> users (actor_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    spaces,
    space_members,
    commitments,
    commitment_approvers,
    commitment_events,
);
