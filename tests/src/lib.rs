//! Peg Engine Integration Tests
//!
//! Multi-contract scenarios on the Odra test VM: engine, PUSD token, mock
//! feeds and mock collateral deployed together.

#[cfg(test)]
mod math_tests {
    use odra::casper_types::U256;
    use peg_engine_contracts::errors::EngineError;
    use peg_engine_contracts::math::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_conversion_never_gains_value() {
        let prices = [1u64, 99_999_999, 2000_00000000, 123_456_789_012];
        let amounts = [1u64, 7, 1_000_000_007, 999_999_999_999_999_999];
        for decimals in [0u8, 6, 8, 18] {
            for price in prices {
                for amount in amounts {
                    let (price, amount) = (U256::from(price), U256::from(amount));
                    let usd = usd_value(price, amount, decimals).unwrap();
                    let back = token_amount_from_usd(usd, decimals, price).unwrap();
                    assert!(back <= amount, "{price} {amount} {decimals}");
                }
            }
        }
    }

    #[test]
    fn test_health_factor_scale() {
        let usd = U256::exp10(18);
        assert_eq!(health_factor(usd * U256::from(2u64), usd).unwrap(), U256::from(MIN_HEALTH_FACTOR));
        assert_eq!(health_factor(usd, U256::zero()).unwrap(), U256::MAX);
        assert_eq!(usd_value(U256::zero(), usd, 18), Err(EngineError::DivisionByZero));
    }
}

#[cfg(test)]
mod engine_scenarios {
    use odra::casper_types::U256;
    use odra::host::{Deployer, HostEnv};
    use odra::prelude::*;
    use peg_engine_contracts::engine::{IssuanceEngine, IssuanceEngineHostRef, IssuanceEngineInitArgs};
    use peg_engine_contracts::errors::EngineError;
    use peg_engine_contracts::math::MIN_HEALTH_FACTOR;
    use peg_engine_contracts::mocks::{
        MockCollateralToken, MockCollateralTokenHostRef, MockCollateralTokenInitArgs, MockPriceFeed,
        MockPriceFeedHostRef, MockPriceFeedInitArgs,
    };
    use peg_engine_contracts::stablecoin::{PegUsd, PegUsdHostRef, PegUsdInitArgs};
    use peg_engine_contracts::types::{AccountInformation, CollateralAsset, EngineCall, SystemTotals};
    use pretty_assertions::assert_eq;

    const ETH_PRICE: u64 = 2000_00000000;
    const TIMEOUT: u64 = 3600;

    struct System {
        env: HostEnv,
        engine: IssuanceEngineHostRef,
        pusd: PegUsdHostRef,
        weth: MockCollateralTokenHostRef,
        feed: MockPriceFeedHostRef,
    }

    fn tokens(whole: u64) -> U256 {
        U256::from(whole) * U256::exp10(18)
    }

    fn deploy_system() -> System {
        let env = odra_test::env();
        env.advance_block_time(1_000_000);
        let admin = env.get_account(0);

        let mut pusd = PegUsd::deploy(&env, PegUsdInitArgs { admin });
        let weth = MockCollateralToken::deploy(
            &env,
            MockCollateralTokenInitArgs { symbol: String::from("WETH"), decimals: 18 },
        );
        let feed = MockPriceFeed::deploy(
            &env,
            MockPriceFeedInitArgs { decimals: 8, initial_answer: U256::from(ETH_PRICE) },
        );
        let mut engine = IssuanceEngine::deploy(
            &env,
            IssuanceEngineInitArgs {
                admin,
                synthetic_token: pusd.address().clone(),
                collateral: vec![CollateralAsset {
                    token: weth.address().clone(),
                    price_feed: feed.address().clone(),
                    decimals: 18,
                }],
            },
        );
        pusd.add_minter(engine.address().clone());
        engine.set_feed_timeout(feed.address().clone(), TIMEOUT);

        System { env, engine, pusd, weth, feed }
    }

    impl System {
        fn open(&mut self, user: Address, collateral: U256, debt: U256) {
            self.weth.mint(user, collateral);
            self.env.set_caller(user);
            self.weth.approve(self.engine.address().clone(), collateral);
            self.engine
                .deposit_collateral_and_mint_debt(self.weth.address().clone(), collateral, debt);
        }

        fn assert_healthy(&self, user: Address) {
            assert!(self.engine.get_health_factor(user) >= U256::from(MIN_HEALTH_FACTOR));
        }
    }

    #[test]
    fn test_ten_eth_at_two_thousand() {
        let mut sys = deploy_system();
        let user = sys.env.get_account(1);
        sys.open(user, tokens(10), tokens(9_999));

        assert_eq!(
            sys.engine.get_account_information(user),
            AccountInformation { total_debt: tokens(9_999), collateral_value_usd: tokens(20_000) }
        );
        sys.engine.mint_debt(tokens(1), user);
        assert_eq!(sys.engine.get_health_factor(user), U256::from(MIN_HEALTH_FACTOR));
        assert_eq!(
            sys.engine.try_mint_debt(U256::one(), user),
            Err(EngineError::HealthFactorBroken.into())
        );
    }

    #[test]
    fn test_positions_are_isolated() {
        let mut sys = deploy_system();
        let alice = sys.env.get_account(1);
        let bob = sys.env.get_account(2);
        sys.open(alice, tokens(10), tokens(10_000));
        sys.open(bob, tokens(1), tokens(100));

        // Alice is at the limit; Bob's spare collateral does not help her.
        sys.env.set_caller(alice);
        assert_eq!(
            sys.engine.try_mint_debt(tokens(1), alice),
            Err(EngineError::HealthFactorBroken.into())
        );
        sys.env.set_caller(bob);
        sys.engine.mint_debt(tokens(100), bob);

        assert_eq!(
            sys.engine.get_system_totals(),
            SystemTotals { total_debt: tokens(10_200), collateral_count: 1 }
        );
        assert_eq!(sys.pusd.total_supply(), tokens(10_200));
        assert_eq!(sys.engine.get_total_collateral(sys.weth.address().clone()), tokens(11));
    }

    #[test]
    fn test_every_successful_step_keeps_actor_healthy() {
        let mut sys = deploy_system();
        let users = [sys.env.get_account(1), sys.env.get_account(2), sys.env.get_account(3)];
        let weth = sys.weth.address().clone();
        for user in users {
            sys.open(user, tokens(5), tokens(1_000));
        }

        let amounts = [tokens(400), tokens(2_000), tokens(1), tokens(3_500), tokens(250)];
        for (round, amount) in amounts.into_iter().enumerate() {
            for (i, user) in users.into_iter().enumerate() {
                sys.env.set_caller(user);
                let calls = match (round + i) % 3 {
                    0 => vec![EngineCall::mint(amount, user)],
                    1 => vec![EngineCall::redeem(weth, amount / U256::from(1000u64), user)],
                    _ => vec![EngineCall::burn(amount.min(sys.engine.get_debt(user)), user)],
                };
                if sys.engine.try_execute_batch(calls).is_ok() {
                    sys.assert_healthy(user);
                }
            }
        }

        for user in users {
            sys.assert_healthy(user);
        }
        let debt_sum = users
            .iter()
            .fold(U256::zero(), |acc, user| acc + sys.engine.get_debt(*user));
        assert_eq!(sys.engine.get_system_totals().total_debt, debt_sum);
        assert_eq!(sys.pusd.total_supply(), debt_sum);
    }

    #[test]
    fn test_oracle_outage_freezes_risky_operations_only() {
        let mut sys = deploy_system();
        let user = sys.env.get_account(1);
        let weth = sys.weth.address().clone();
        sys.open(user, tokens(10), tokens(1_000));

        sys.env.advance_block_time((TIMEOUT + 1) * 1000);
        sys.env.set_caller(user);
        assert_eq!(
            sys.engine.try_mint_debt(tokens(1), user),
            Err(EngineError::StaleData.into())
        );
        assert_eq!(
            sys.engine.try_redeem_collateral(weth, tokens(1), user),
            Err(EngineError::StaleData.into())
        );
        assert_eq!(
            sys.engine.try_get_health_factor(user),
            Err(EngineError::StaleData.into())
        );

        // Deposits and repayments need no price.
        sys.engine.burn_debt(tokens(500), user);
        sys.weth.mint(user, tokens(1));
        sys.env.set_caller(user);
        sys.weth.approve(sys.engine.address().clone(), tokens(1));
        sys.engine.deposit_collateral(weth, tokens(1));

        sys.feed.update_answer(U256::from(ETH_PRICE));
        assert_eq!(
            sys.engine.get_account_information(user),
            AccountInformation { total_debt: tokens(500), collateral_value_usd: tokens(22_000) }
        );
    }

    #[test]
    fn test_rewards_do_not_create_debt() {
        let mut sys = deploy_system();
        let airdrop = sys.env.get_account(5);
        let pool = sys.env.get_account(6);
        let holder = sys.env.get_account(7);

        sys.env.set_caller(sys.env.get_account(0));
        sys.engine.set_reward_minters(airdrop, pool);

        sys.env.set_caller(airdrop);
        sys.engine.mint_for_airdrop(holder, tokens(50));
        sys.env.set_caller(pool);
        sys.engine.mint_for_pool(holder, tokens(25));

        // The holder can spend rewards to repay somebody else's debt.
        let borrower = sys.env.get_account(1);
        sys.open(borrower, tokens(1), tokens(100));
        sys.env.set_caller(holder);
        sys.engine.burn_debt(tokens(75), borrower);

        assert_eq!(sys.engine.get_debt(borrower), tokens(25));
        assert_eq!(sys.pusd.balance_of(holder), U256::zero());
        assert_eq!(sys.pusd.total_supply(), tokens(100));
    }
}
