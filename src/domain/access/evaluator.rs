//! The access evaluator.
//!
//! Every boundary (JSON API, redirect pages, purchase flow) asks these
//! functions and nothing else whether a principal may see or change
//! catalog content. They are pure: callers load the principal, course and
//! lesson first, then translate a `Denied` into their own rejection.
//!
//! # Rules
//!
//! Viewing a lesson is granted to an authenticated principal when any of:
//! the course is free, the course was bought, the principal owns the course,
//! the principal owns the lesson, or the principal is a superuser. Anonymous
//! principals are always denied, free courses included.
//!
//! Editing is granted to superusers, the target's owner, and for lessons
//! also the owner of the lesson's course. An account is owned by itself.
//!
//! Having *started* a course never matters here.

use crate::domain::catalog::{Course, Lesson};
use crate::domain::foundation::Owned;
use crate::domain::user::{Principal, User};

use super::{AccessDecision, DenialReason};

/// What a principal wants to modify.
#[derive(Debug, Clone, Copy)]
pub enum EditTarget<'a> {
    Course(&'a Course),
    /// A lesson together with the course it belongs to.
    Lesson {
        lesson: &'a Lesson,
        course: &'a Course,
    },
    /// A user's own profile.
    Account(&'a User),
}

/// Whether the principal may view the lessons of `course`.
pub fn can_view_course(principal: &Principal, course: &Course) -> AccessDecision {
    let Some(user) = principal.user() else {
        return AccessDecision::Denied(DenialReason::NotAuthenticated);
    };

    if course_unlocked_for(user, course) {
        AccessDecision::Granted
    } else {
        AccessDecision::Denied(DenialReason::NotPurchased)
    }
}

/// Whether the principal may view `lesson`. `course` must be the lesson's course.
pub fn can_view_lesson(principal: &Principal, course: &Course, lesson: &Lesson) -> AccessDecision {
    debug_assert!(lesson.belongs_to(&course.id));

    let Some(user) = principal.user() else {
        return AccessDecision::Denied(DenialReason::NotAuthenticated);
    };

    if course_unlocked_for(user, course) || lesson.is_owned_by(&user.id) {
        AccessDecision::Granted
    } else {
        AccessDecision::Denied(DenialReason::NotPurchased)
    }
}

/// Whether the principal may modify the target.
pub fn can_edit(principal: &Principal, target: EditTarget<'_>) -> AccessDecision {
    let Some(user) = principal.user() else {
        return AccessDecision::Denied(DenialReason::NotAuthenticated);
    };

    let is_author = match target {
        EditTarget::Course(course) => course.is_owned_by(&user.id),
        EditTarget::Lesson { lesson, course } => {
            lesson.is_owned_by(&user.id) || course.is_owned_by(&user.id)
        }
        EditTarget::Account(account) => account.id == user.id,
    };

    if user.is_superuser || is_author {
        AccessDecision::Granted
    } else {
        AccessDecision::Denied(DenialReason::InsufficientPrivilege)
    }
}

fn course_unlocked_for(user: &User, course: &Course) -> bool {
    user.is_superuser
        || !course.is_paid()
        || user.has_bought(&course.id)
        || course.is_owned_by(&user.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{CoursePricing, Price};
    use crate::domain::foundation::UserId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn paid_course(owner: Option<UserId>) -> Course {
        let price = Price::new(dec!(500)).unwrap();
        Course::new("Paid", owner, CoursePricing::Paid(price)).unwrap()
    }

    fn free_course(owner: Option<UserId>) -> Course {
        Course::new("Free", owner, CoursePricing::Free).unwrap()
    }

    fn lesson_of(course: &Course, owner: Option<UserId>) -> Lesson {
        Lesson::new(course.id, "Lesson", owner).unwrap()
    }

    fn member() -> User {
        User::new("member", "member@example.com", "+15550003333").unwrap()
    }

    fn signed_in(user: User) -> Principal {
        Principal::Authenticated(user)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // can_view_lesson
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn anonymous_is_denied_even_on_free_course() {
        let course = free_course(None);
        let lesson = lesson_of(&course, None);
        assert_eq!(
            can_view_lesson(&Principal::Anonymous, &course, &lesson),
            AccessDecision::Denied(DenialReason::NotAuthenticated)
        );
    }

    #[test]
    fn member_views_free_course_lesson() {
        let course = free_course(None);
        let lesson = lesson_of(&course, None);
        assert!(can_view_lesson(&signed_in(member()), &course, &lesson).is_granted());
    }

    #[test]
    fn member_without_purchase_is_denied_paid_lesson() {
        let course = paid_course(None);
        let lesson = lesson_of(&course, None);
        assert_eq!(
            can_view_lesson(&signed_in(member()), &course, &lesson),
            AccessDecision::Denied(DenialReason::NotPurchased)
        );
    }

    #[test]
    fn buyer_views_paid_lesson() {
        let course = paid_course(None);
        let lesson = lesson_of(&course, None);
        let mut user = member();
        user.bought_courses.insert(course.id);
        assert!(can_view_lesson(&signed_in(user), &course, &lesson).is_granted());
    }

    #[test]
    fn started_course_does_not_unlock_paid_lesson() {
        let course = paid_course(None);
        let lesson = lesson_of(&course, None);
        let mut user = member();
        user.started_courses.insert(course.id);
        assert!(can_view_lesson(&signed_in(user), &course, &lesson).is_denied());
    }

    #[test]
    fn course_owner_views_own_paid_lesson() {
        let user = member();
        let course = paid_course(Some(user.id));
        let lesson = lesson_of(&course, None);
        assert!(can_view_lesson(&signed_in(user), &course, &lesson).is_granted());
    }

    #[test]
    fn lesson_owner_views_lesson_in_paid_course() {
        let user = member();
        let course = paid_course(None);
        let lesson = lesson_of(&course, Some(user.id));
        assert!(can_view_lesson(&signed_in(user), &course, &lesson).is_granted());
    }

    #[test]
    fn lesson_owner_is_not_granted_whole_course() {
        let user = member();
        let course = paid_course(None);
        assert!(can_view_course(&signed_in(user), &course).is_denied());
    }

    #[test]
    fn superuser_views_everything() {
        let course = paid_course(None);
        let lesson = lesson_of(&course, None);
        let admin = member().as_superuser();
        assert!(can_view_lesson(&signed_in(admin), &course, &lesson).is_granted());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // can_edit
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn course_owner_edits_course_and_its_lessons() {
        let user = member();
        let course = free_course(Some(user.id));
        let lesson = lesson_of(&course, None);
        let principal = signed_in(user);

        assert!(can_edit(&principal, EditTarget::Course(&course)).is_granted());
        assert!(can_edit(
            &principal,
            EditTarget::Lesson {
                lesson: &lesson,
                course: &course
            }
        )
        .is_granted());
    }

    #[test]
    fn lesson_owner_cannot_edit_the_course() {
        let user = member();
        let course = free_course(None);
        let lesson = lesson_of(&course, Some(user.id));
        let principal = signed_in(user);

        assert!(can_edit(
            &principal,
            EditTarget::Lesson {
                lesson: &lesson,
                course: &course
            }
        )
        .is_granted());
        assert_eq!(
            can_edit(&principal, EditTarget::Course(&course)),
            AccessDecision::Denied(DenialReason::InsufficientPrivilege)
        );
    }

    #[test]
    fn buyer_cannot_edit() {
        let course = paid_course(None);
        let mut user = member();
        user.bought_courses.insert(course.id);
        assert_eq!(
            can_edit(&signed_in(user), EditTarget::Course(&course)),
            AccessDecision::Denied(DenialReason::InsufficientPrivilege)
        );
    }

    #[test]
    fn anonymous_edit_is_not_authenticated() {
        let course = free_course(None);
        assert_eq!(
            can_edit(&Principal::Anonymous, EditTarget::Course(&course)),
            AccessDecision::Denied(DenialReason::NotAuthenticated)
        );
    }

    #[test]
    fn account_is_edited_by_itself_or_superuser() {
        let account = member();
        let other = User::new("other", "other@example.com", "+15550004444").unwrap();
        let mut admin = User::new("admin", "admin@example.com", "+15550005555").unwrap();
        admin.is_superuser = true;

        assert!(can_edit(&signed_in(account.clone()), EditTarget::Account(&account)).is_granted());
        assert!(can_edit(&signed_in(admin), EditTarget::Account(&account)).is_granted());
        assert_eq!(
            can_edit(&signed_in(other), EditTarget::Account(&account)),
            AccessDecision::Denied(DenialReason::InsufficientPrivilege)
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Properties
    // ════════════════════════════════════════════════════════════════════════════

    #[derive(Debug, Clone)]
    struct Scenario {
        authenticated: bool,
        superuser: bool,
        course_paid: bool,
        bought: bool,
        started: bool,
        owns_course: bool,
        owns_lesson: bool,
    }

    fn scenario() -> impl Strategy<Value = Scenario> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(authenticated, superuser, course_paid, bought, started, owns_course, owns_lesson)| {
                    Scenario {
                        authenticated,
                        superuser,
                        course_paid,
                        bought,
                        started,
                        owns_course,
                        owns_lesson,
                    }
                },
            )
    }

    fn build(s: &Scenario) -> (Principal, Course, Lesson) {
        let mut user = member();
        user.is_superuser = s.superuser;
        let other = UserId::new();

        let course_owner = Some(if s.owns_course { user.id } else { other });
        let course = if s.course_paid {
            paid_course(course_owner)
        } else {
            free_course(course_owner)
        };
        let lesson = lesson_of(&course, Some(if s.owns_lesson { user.id } else { other }));

        if s.bought {
            user.bought_courses.insert(course.id);
        }
        if s.started {
            user.started_courses.insert(course.id);
        }

        let principal = if s.authenticated {
            Principal::Authenticated(user)
        } else {
            Principal::Anonymous
        };
        (principal, course, lesson)
    }

    proptest! {
        #[test]
        fn unauthenticated_never_views(s in scenario()) {
            let s = Scenario { authenticated: false, ..s };
            let (principal, course, lesson) = build(&s);
            prop_assert_eq!(
                can_view_lesson(&principal, &course, &lesson),
                AccessDecision::Denied(DenialReason::NotAuthenticated)
            );
        }

        #[test]
        fn authenticated_views_free_course_lessons(s in scenario()) {
            let s = Scenario {
                authenticated: true,
                superuser: false,
                owns_course: false,
                owns_lesson: false,
                course_paid: false,
                ..s
            };
            let (principal, course, lesson) = build(&s);
            prop_assert!(can_view_lesson(&principal, &course, &lesson).is_granted());
        }

        #[test]
        fn paid_lesson_requires_purchase_for_plain_members(s in scenario()) {
            let s = Scenario {
                authenticated: true,
                superuser: false,
                owns_course: false,
                owns_lesson: false,
                course_paid: true,
                ..s
            };
            let (principal, course, lesson) = build(&s);
            prop_assert_eq!(
                can_view_lesson(&principal, &course, &lesson).is_granted(),
                s.bought
            );
        }

        #[test]
        fn view_rule_matches_disjunction(s in scenario()) {
            let (principal, course, lesson) = build(&s);
            let expected = s.authenticated
                && (!s.course_paid || s.bought || s.owns_course || s.owns_lesson || s.superuser);
            prop_assert_eq!(can_view_lesson(&principal, &course, &lesson).is_granted(), expected);
        }

        #[test]
        fn edit_rule_matches_owners_and_superusers(s in scenario()) {
            let (principal, course, lesson) = build(&s);
            let lesson_edit = can_edit(&principal, EditTarget::Lesson { lesson: &lesson, course: &course });
            let course_edit = can_edit(&principal, EditTarget::Course(&course));

            prop_assert_eq!(
                lesson_edit.is_granted(),
                s.authenticated && (s.superuser || s.owns_lesson || s.owns_course)
            );
            prop_assert_eq!(
                course_edit.is_granted(),
                s.authenticated && (s.superuser || s.owns_course)
            );
        }
    }
}
